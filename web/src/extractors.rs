//! Custom Axum extractors for the broker envelope.
//!
//! - [`BrokerEnvelope`]: the platform instance prefix and the
//!   `X-Broker-API-*` / `X-Api-Info-Location` headers
//! - [`AcceptsIncomplete`]: the `accepts_incomplete` query flag
//!
//! # Examples
//!
//! ```ignore
//! async fn handler(
//!     State(state): State<AppState>,
//!     BrokerEnvelope(envelope): BrokerEnvelope,
//!     AcceptsIncomplete(accepts_incomplete): AcceptsIncomplete,
//! ) -> Result<Reply<R>, AppError> {
//!     tracing::debug!(request_identity = ?envelope.request_identity, "Processing request");
//!     ...
//! }
//! ```

use crate::error::AppError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query},
    http::{request::Parts, HeaderMap},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use serde_json::{Map, Value};
use service_broker_core::{OriginatingIdentity, RequestEnvelope};
use std::collections::HashMap;

/// Header carrying `<platform> <base64 json>` identity of the calling user.
pub const ORIGINATING_IDENTITY_HEADER: &str = "X-Broker-API-Originating-Identity";

/// Header carrying the platform's request identifier.
pub const REQUEST_IDENTITY_HEADER: &str = "X-Broker-API-Request-Identity";

/// Header carrying the location of the platform's API info endpoint.
pub const API_INFO_LOCATION_HEADER: &str = "X-Api-Info-Location";

/// Path parameter of the optional platform prefix.
pub const PLATFORM_INSTANCE_ID_PARAM: &str = "platform_instance_id";

/// Envelope fields common to every broker request.
#[derive(Debug, Clone, Default)]
pub struct BrokerEnvelope(pub RequestEnvelope);

#[async_trait]
impl<S> FromRequestParts<S> for BrokerEnvelope
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Routes without the platform prefix carry no such parameter
        let platform_instance_id = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .ok()
            .and_then(|Path(mut params)| params.remove(PLATFORM_INSTANCE_ID_PARAM));

        Ok(Self(RequestEnvelope {
            platform_instance_id,
            api_info_location: header_string(&parts.headers, API_INFO_LOCATION_HEADER),
            originating_identity: header_string(&parts.headers, ORIGINATING_IDENTITY_HEADER)
                .map(|value| parse_originating_identity(&value))
                .transpose()?,
            request_identity: header_string(&parts.headers, REQUEST_IDENTITY_HEADER),
        }))
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Decode an originating identity header value.
///
/// # Errors
///
/// Returns a 422 [`AppError`] unless the value is a platform name, a single
/// space, and base64-encoded JSON object.
pub fn parse_originating_identity(value: &str) -> Result<OriginatingIdentity, AppError> {
    let malformed = |detail: &str| {
        AppError::unprocessable(format!(
            "Malformed {ORIGINATING_IDENTITY_HEADER} header: {detail}"
        ))
    };

    let (platform, encoded) = value
        .trim()
        .split_once(' ')
        .ok_or_else(|| malformed("expected '<platform> <base64 properties>'"))?;
    if platform.is_empty() {
        return Err(malformed("platform is empty"));
    }

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|e| malformed(&format!("properties are not base64: {e}")))?;
    let properties: Map<String, Value> = serde_json::from_slice(&decoded)
        .map_err(|e| malformed(&format!("properties are not a JSON object: {e}")))?;

    Ok(OriginatingIdentity {
        platform: platform.to_string(),
        properties,
    })
}

/// The `accepts_incomplete` query flag; absent means `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptsIncomplete(pub bool);

#[derive(Debug, Default, Deserialize)]
struct AcceptsIncompleteParams {
    #[serde(default)]
    accepts_incomplete: bool,
}

#[async_trait]
impl<S> FromRequestParts<S> for AcceptsIncomplete
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<AcceptsIncompleteParams>::from_request_parts(parts, state).await?;
        Ok(Self(params.accepts_incomplete))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    fn encode(json: &str) -> String {
        STANDARD.encode(json)
    }

    #[test]
    fn test_parse_originating_identity() {
        let value = format!("cloudfoundry {}", encode(r#"{"user_id":"683ea748"}"#));

        let identity = parse_originating_identity(&value).unwrap();

        assert_eq!(identity.platform, "cloudfoundry");
        assert_eq!(identity.properties["user_id"], "683ea748");
    }

    #[test]
    fn test_parse_originating_identity_rejects_malformed_values() {
        for value in [
            "cloudfoundry".to_string(),
            "cloudfoundry not-base64!".to_string(),
            format!("kubernetes {}", encode("[1, 2]")),
            format!(" {}", encode("{}")),
        ] {
            let err = parse_originating_identity(&value).unwrap_err();
            assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY, "{value}");
        }
    }

    #[tokio::test]
    async fn test_envelope_from_headers() {
        let request = Request::builder()
            .uri("/v2/catalog")
            .header(REQUEST_IDENTITY_HEADER, "req-42")
            .header(API_INFO_LOCATION_HEADER, "api.example.com/v2/info")
            .header(
                ORIGINATING_IDENTITY_HEADER,
                format!("kubernetes {}", encode(r#"{"username":"ops"}"#)),
            )
            .body(())
            .unwrap();
        let (mut parts, ()) = request.into_parts();

        let BrokerEnvelope(envelope) = BrokerEnvelope::from_request_parts(&mut parts, &())
            .await
            .unwrap();

        assert_eq!(envelope.request_identity.as_deref(), Some("req-42"));
        assert_eq!(envelope.api_info_location.as_deref(), Some("api.example.com/v2/info"));
        assert_eq!(envelope.originating_identity.unwrap().platform, "kubernetes");
        assert!(envelope.platform_instance_id.is_none());
    }

    #[tokio::test]
    async fn test_accepts_incomplete() {
        for (uri, expected) in [
            ("/v2/service_instances/1", false),
            ("/v2/service_instances/1?accepts_incomplete=true", true),
            ("/v2/service_instances/1?accepts_incomplete=false&plan_id=p", false),
        ] {
            let (mut parts, ()) = Request::builder().uri(uri).body(()).unwrap().into_parts();

            let AcceptsIncomplete(flag) = AcceptsIncomplete::from_request_parts(&mut parts, &())
                .await
                .unwrap();

            assert_eq!(flag, expected, "{uri}");
        }
    }
}
