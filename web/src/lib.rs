//! Axum transport adapter for the service broker.
//!
//! The orchestrator in `service-broker-runtime` is transport-agnostic; this
//! crate maps the Open Service Broker HTTP surface onto it.
//!
//! # Request Flow
//!
//! 1. **Middleware**: [`middleware::ApiVersionLayer`] checks
//!    `X-Broker-API-Version`; [`middleware::RequestIdentityLayer`] opens a span
//!    and echoes `X-Broker-API-Request-Identity`
//! 2. **Extract**: path ids, `accepts_incomplete`, envelope headers, body or query
//! 3. **Orchestrate**: the handler passes an `Inbound` to the broker
//! 4. **Render**: the `BrokerResponse` status and body go out unchanged
//!
//! Requests the orchestrator never sees (unreadable JSON, missing query
//! parameters, malformed identity headers) are rejected with 422 by
//! [`AppError`].
//!
//! # Example
//!
//! ```ignore
//! use service_broker_web::{config::{init_tracing, BrokerConfig}, server};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = BrokerConfig::from_env()?;
//!     init_tracing(&config);
//!
//!     let broker = ServiceBroker::builder(catalog, Arc::new(MyInstances)).build();
//!     server::serve(broker, config).await
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod server;
pub mod state;

pub use config::{init_tracing, BrokerConfig, ConfigError};
pub use error::AppError;
pub use extractors::{AcceptsIncomplete, BrokerEnvelope};
pub use handlers::Reply;
pub use middleware::{request_identity_layer, ApiVersionLayer, API_VERSION_HEADER};
pub use server::{app, build_router, serve};
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
