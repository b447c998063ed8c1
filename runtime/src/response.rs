//! Protocol responses produced by the orchestrator.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error body returned for every failed request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Machine-readable error code, e.g. `AsyncRequired`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Human-readable description
    pub description: String,
    /// Operation still in progress, for `OperationInProgress` failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

impl ErrorMessage {
    /// Error body with only a description.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            error: None,
            description: description.into(),
            operation: None,
        }
    }

    /// Set the error code.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Set the in-progress operation.
    #[must_use]
    pub fn with_operation(mut self, operation: Option<String>) -> Self {
        self.operation = operation;
        self
    }
}

/// Body shape of a broker response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody<T> {
    /// The service returned nothing; rendered as `{}`
    Empty,
    /// The service's response
    Json(T),
    /// A failure
    Error(ErrorMessage),
}

impl<T: Serialize> ResponseBody<T> {
    /// Render the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the response value cannot be serialized.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Empty => Ok(Value::Object(serde_json::Map::new())),
            Self::Json(value) => serde_json::to_value(value),
            Self::Error(message) => serde_json::to_value(message),
        }
    }
}

/// Status code and body for one request; the orchestrator's only output.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerResponse<T> {
    /// Protocol status code
    pub status: StatusCode,
    /// Response body
    pub body: ResponseBody<T>,
}

impl<T> BrokerResponse<T> {
    /// Empty body with the given status.
    #[must_use]
    pub const fn empty(status: StatusCode) -> Self {
        Self {
            status,
            body: ResponseBody::Empty,
        }
    }

    /// JSON body with the given status.
    #[must_use]
    pub const fn json(status: StatusCode, value: T) -> Self {
        Self {
            status,
            body: ResponseBody::Json(value),
        }
    }

    /// Error body with the given status.
    #[must_use]
    pub const fn error(status: StatusCode, message: ErrorMessage) -> Self {
        Self {
            status,
            body: ResponseBody::Error(message),
        }
    }

    /// The service's response, when there is one.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Empty | ResponseBody::Error(_) => None,
        }
    }

    /// The error body, when the request failed.
    #[must_use]
    pub const fn error_message(&self) -> Option<&ErrorMessage> {
        match &self.body {
            ResponseBody::Error(message) => Some(message),
            ResponseBody::Empty | ResponseBody::Json(_) => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_body_renders_as_empty_object() {
        let response: BrokerResponse<Value> = BrokerResponse::empty(StatusCode::OK);
        assert_eq!(response.body.to_json().unwrap(), json!({}));
        assert!(response.value().is_none());
    }

    #[test]
    fn test_error_body_omits_absent_fields() {
        let message = ErrorMessage::new("instance exists");
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({ "description": "instance exists" })
        );

        let message = ErrorMessage::new("retry").with_error("AsyncRequired");
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({ "error": "AsyncRequired", "description": "retry" })
        );
    }
}
