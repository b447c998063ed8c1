//! Tower middleware for the broker API surface.
//!
//! - [`RequestIdentityLayer`]: opens a tracing span per request and echoes
//!   `X-Broker-API-Request-Identity` back on the response
//! - [`ApiVersionLayer`]: rejects requests whose `X-Broker-API-Version` does not
//!   match the configured version with 412 Precondition Failed
//!
//! # Example
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/v2/catalog", get(get_catalog))
//!     .layer(ApiVersionLayer::new("2.13"))
//!     .layer(request_identity_layer());
//! ```

use crate::error::AppError;
use crate::extractors::REQUEST_IDENTITY_HEADER;
use axum::{
    extract::Request,
    response::{IntoResponse, Response},
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::Instrument;

/// Header carrying the broker API version the platform speaks.
pub const API_VERSION_HEADER: &str = "X-Broker-API-Version";

/// Configured version value that accepts any platform version.
pub const ANY_API_VERSION: &str = "*";

type BoxFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send>>;

/// Create a layer that traces requests and echoes the request identity.
#[must_use]
pub const fn request_identity_layer() -> RequestIdentityLayer {
    RequestIdentityLayer
}

/// Layer for request identity tracking.
#[derive(Clone, Debug)]
pub struct RequestIdentityLayer;

impl<S> Layer<S> for RequestIdentityLayer {
    type Service = RequestIdentityMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdentityMiddleware { inner }
    }
}

/// Middleware service for request identity tracking.
#[derive(Clone, Debug)]
pub struct RequestIdentityMiddleware<S> {
    inner: S,
}

impl<S> Service<Request> for RequestIdentityMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let request_identity = req.headers().get(REQUEST_IDENTITY_HEADER).cloned();

        let span = tracing::info_span!(
            "broker_request",
            request_identity = request_identity
                .as_ref()
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default(),
            method = %req.method(),
            uri = %req.uri(),
        );

        let fut = self.inner.call(req);

        Box::pin(async move {
            let mut response = fut.instrument(span).await?;

            if let Some(header_value) = request_identity {
                response
                    .headers_mut()
                    .insert(REQUEST_IDENTITY_HEADER, header_value);
            }

            Ok(response)
        })
    }
}

/// Layer enforcing the `X-Broker-API-Version` header.
#[derive(Clone, Debug)]
pub struct ApiVersionLayer {
    expected: Option<Arc<str>>,
}

impl ApiVersionLayer {
    /// Require exactly `expected`; [`ANY_API_VERSION`] disables the check.
    #[must_use]
    pub fn new(expected: &str) -> Self {
        Self {
            expected: (expected != ANY_API_VERSION).then(|| Arc::from(expected)),
        }
    }

    /// Accept every request.
    #[must_use]
    pub const fn any() -> Self {
        Self { expected: None }
    }
}

impl<S> Layer<S> for ApiVersionLayer {
    type Service = ApiVersionMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ApiVersionMiddleware {
            inner,
            expected: self.expected.clone(),
        }
    }
}

/// Middleware service enforcing the API version.
#[derive(Clone, Debug)]
pub struct ApiVersionMiddleware<S> {
    inner: S,
    expected: Option<Arc<str>>,
}

impl<S> Service<Request> for ApiVersionMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        if let Some(expected) = &self.expected {
            let provided = req
                .headers()
                .get(API_VERSION_HEADER)
                .and_then(|v| v.to_str().ok());

            if provided != Some(expected.as_ref()) {
                let response = AppError::unsupported_version(expected, provided).into_response();
                return Box::pin(async move { Ok(response) });
            }
        }

        Box::pin(self.inner.call(req))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::get, Router};
    use tower::ServiceExt;

    fn app(layer: ApiVersionLayer) -> Router {
        Router::new()
            .route("/v2/catalog", get(|| async { "ok" }))
            .layer(layer)
            .layer(request_identity_layer())
    }

    fn request(version: Option<&str>, identity: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/v2/catalog");
        if let Some(version) = version {
            builder = builder.header(API_VERSION_HEADER, version);
        }
        if let Some(identity) = identity {
            builder = builder.header(REQUEST_IDENTITY_HEADER, identity);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_request_identity_echoed() {
        let response = app(ApiVersionLayer::any())
            .oneshot(request(None, Some("req-7")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(REQUEST_IDENTITY_HEADER).unwrap(), "req-7");
    }

    #[tokio::test]
    async fn test_no_identity_header_when_absent() {
        let response = app(ApiVersionLayer::any())
            .oneshot(request(None, None))
            .await
            .unwrap();

        assert!(response.headers().get(REQUEST_IDENTITY_HEADER).is_none());
    }

    #[tokio::test]
    async fn test_version_mismatch_rejected() {
        for version in [None, Some("2.11")] {
            let response = app(ApiVersionLayer::new("2.13"))
                .oneshot(request(version, Some("req-8")))
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
            // Rejections still carry the identity
            assert_eq!(response.headers().get(REQUEST_IDENTITY_HEADER).unwrap(), "req-8");
        }
    }

    #[tokio::test]
    async fn test_version_match_and_wildcard() {
        let response = app(ApiVersionLayer::new("2.13"))
            .oneshot(request(Some("2.13"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app(ApiVersionLayer::new(ANY_API_VERSION))
            .oneshot(request(Some("2.11"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
