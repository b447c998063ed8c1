//! Transport-level errors.
//!
//! Failures the orchestrator never sees: unreadable bodies, missing query
//! parameters, malformed envelope headers and API version mismatches. They are
//! rendered with the same `{error?, description}` body the orchestrator uses.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use service_broker_runtime::ErrorMessage;
use std::fmt;

/// Application error type for broker handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler(body: Result<Json<Body>, JsonRejection>) -> Result<Reply<R>, AppError> {
///     let Json(body) = body?;
///     Ok(Reply(broker.instances().create_service_instance(inbound(body)).await))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    /// Machine-readable code placed in the `error` field
    code: Option<String>,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String) -> Self {
        Self {
            status,
            message,
            code: None,
            source: None,
        }
    }

    /// Attach a machine-readable error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Attach the underlying error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 422 Unprocessable Entity error.
    #[must_use]
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message.into())
    }

    /// Create a 412 Precondition Failed error for an unsupported API version.
    #[must_use]
    pub fn unsupported_version(expected: &str, provided: Option<&str>) -> Self {
        Self::new(
            StatusCode::PRECONDITION_FAILED,
            format!(
                "The provided service broker API version is not supported: expected version={expected}, provided version={}",
                provided.unwrap_or("null")
            ),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message.into())
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// User-facing description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    fn body(&self) -> ErrorMessage {
        let message = ErrorMessage::new(self.message.clone());
        match &self.code {
            Some(code) => message.with_error(code.clone()),
            None => message,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(status = %self.status, message = %self.message, "Internal server error");
            }
        } else {
            tracing::debug!(status = %self.status, message = %self.message, "Request rejected");
        }

        (self.status, Json(self.body())).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::unprocessable(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::unprocessable(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::unprocessable("Missing required fields: plan_id");
        assert_eq!(err.to_string(), "[422] Missing required fields: plan_id");
    }

    #[test]
    fn test_unsupported_version() {
        let err = AppError::unsupported_version("2.13", Some("2.11"));
        assert_eq!(err.status(), StatusCode::PRECONDITION_FAILED);
        assert!(err.message().contains("expected version=2.13"));
        assert!(err.message().contains("provided version=2.11"));

        let missing = AppError::unsupported_version("2.13", None);
        assert!(missing.message().ends_with("provided version=null"));
    }

    #[test]
    fn test_body_carries_code() {
        let err = AppError::unprocessable("bad header").with_code("MalformedHeader");
        assert_eq!(err.body().error.as_deref(), Some("MalformedHeader"));
        assert_eq!(err.body().description, "bad header");
    }

    #[test]
    fn test_anyhow_is_internal() {
        let err: AppError = anyhow::anyhow!("socket closed").into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(std::error::Error::source(&err).is_some());
    }
}
