//! # Service Broker Core
//!
//! Types and traits shared by every layer of an Open Service Broker.
//!
//! A broker request moves through a fixed pipeline:
//!
//! 1. The transport parses path, query, headers and body into an [`model::Inbound`].
//! 2. The runtime resolves catalog entries and builds an immutable request.
//! 3. Initialization hooks run, then the business service, then completion hooks.
//! 4. On failure, error hooks are notified once.
//! 5. The outcome is mapped to a protocol status code and body.
//!
//! This crate owns the pieces the pipeline is assembled from:
//!
//! - [`catalog`]: service definitions, plans and the [`catalog::CatalogService`] lookup
//! - [`model`]: request, response and envelope types per operation
//! - [`event_flow`]: hook traits and the ordered [`event_flow::EventFlowRegistry`]
//! - [`service`]: the business traits broker authors implement
//! - [`error`]: the [`ServiceBrokerError`] taxonomy
//!
//! ## Example
//!
//! ```ignore
//! use service_broker_core::*;
//!
//! struct MyInstances;
//!
//! #[async_trait]
//! impl ServiceInstanceService for MyInstances {
//!     async fn create_service_instance(
//!         &self,
//!         request: &CreateServiceInstanceRequest,
//!     ) -> Result<Option<CreateServiceInstanceResponse>, ServiceBrokerError> {
//!         Ok(Some(CreateServiceInstanceResponse {
//!             dashboard_url: Some(format!("https://dash/{}", request.service_instance_id)),
//!             ..Default::default()
//!         }))
//!     }
//!     // ...
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod error;
pub mod event_flow;
pub mod model;
pub mod service;

pub use async_trait::async_trait;
pub use catalog::{Catalog, CatalogService, InMemoryCatalog, Plan, ServiceDefinition};
pub use error::{CatalogEntry, FlowPhase, Resource, ServiceBrokerError};
pub use event_flow::{CompletionFlow, ErrorFlow, EventFlowRegistries, EventFlowRegistry, InitializationFlow};
pub use model::*;
pub use service::{ServiceInstanceBindingService, ServiceInstanceService};
