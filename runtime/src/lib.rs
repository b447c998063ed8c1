//! # Service Broker Runtime
//!
//! The request lifecycle orchestrator.
//!
//! For every broker request the runtime sequences:
//!
//! ```text
//! RECEIVED → CATALOG_RESOLVED → ENRICHED → INITIALIZED → INVOKED → {COMPLETED | FAILED}
//! ```
//!
//! - **Catalog resolution** ([`resolve`]): create/update fail fast on unknown
//!   ids; delete tolerates them; polls resolve best-effort.
//! - **Enrichment** ([`enrich`]): builds an immutable request value.
//! - **Event flows**: initialization and completion hooks gate the request;
//!   error hooks run exactly once on any failure and never escalate.
//! - **Status mapping** ([`mapper`]): outcome to status code and body.
//!
//! ## Example
//!
//! ```ignore
//! use service_broker_runtime::ServiceBroker;
//!
//! let broker = ServiceBroker::builder(catalog, Arc::new(MyInstances))
//!     .binding_service(Arc::new(MyBindings))
//!     .event_flows(registries)
//!     .build();
//!
//! let response = broker.instances().create_service_instance(inbound).await;
//! assert_eq!(response.status, StatusCode::CREATED);
//! ```

use service_broker_core::{
    CatalogService, EventFlowRegistries, ServiceInstanceBindingService, ServiceInstanceService,
};
use std::sync::Arc;

/// Binding orchestration
pub mod binding;

/// Request enrichment
pub mod enrich;

/// Instance orchestration
pub mod instance;

/// Response code mapping
pub mod mapper;

/// Prometheus metrics for observability
pub mod metrics;

/// Shared pipeline stages
pub mod pipeline;

/// Catalog resolution
pub mod resolve;

/// Orchestrator output types
pub mod response;

pub use binding::BindingOrchestrator;
pub use instance::InstanceOrchestrator;
pub use mapper::ResponseStatus;
pub use resolve::CatalogResolver;
pub use response::{BrokerResponse, ErrorMessage, ResponseBody};

/// A fully wired broker: catalog, instance orchestration and optional binding
/// orchestration sharing one set of event flows.
#[derive(Debug, Clone)]
pub struct ServiceBroker {
    resolver: CatalogResolver,
    instances: InstanceOrchestrator,
    bindings: Option<BindingOrchestrator>,
}

impl ServiceBroker {
    /// Start building a broker.
    #[must_use]
    pub fn builder(
        catalog: Arc<dyn CatalogService>,
        instance_service: Arc<dyn ServiceInstanceService>,
    ) -> ServiceBrokerBuilder {
        ServiceBrokerBuilder {
            catalog,
            instance_service,
            binding_service: None,
            flows: EventFlowRegistries::default(),
        }
    }

    /// The catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<dyn CatalogService> {
        self.resolver.catalog()
    }

    /// Instance orchestration.
    #[must_use]
    pub const fn instances(&self) -> &InstanceOrchestrator {
        &self.instances
    }

    /// Binding orchestration, when a binding service was configured.
    #[must_use]
    pub const fn bindings(&self) -> Option<&BindingOrchestrator> {
        self.bindings.as_ref()
    }
}

/// Builder for [`ServiceBroker`].
pub struct ServiceBrokerBuilder {
    catalog: Arc<dyn CatalogService>,
    instance_service: Arc<dyn ServiceInstanceService>,
    binding_service: Option<Arc<dyn ServiceInstanceBindingService>>,
    flows: EventFlowRegistries,
}

impl ServiceBrokerBuilder {
    /// Enable binding operations.
    #[must_use]
    pub fn binding_service(mut self, service: Arc<dyn ServiceInstanceBindingService>) -> Self {
        self.binding_service = Some(service);
        self
    }

    /// Set the event flow registries.
    #[must_use]
    pub fn event_flows(mut self, flows: EventFlowRegistries) -> Self {
        self.flows = flows;
        self
    }

    /// Build the broker.
    #[must_use]
    pub fn build(self) -> ServiceBroker {
        let resolver = CatalogResolver::new(self.catalog);
        let flows = Arc::new(self.flows);

        tracing::debug!(
            bindings = self.binding_service.is_some(),
            "Service broker configured"
        );

        let bindings = self.binding_service.map(|service| {
            BindingOrchestrator::new(resolver.clone(), service, Arc::clone(&flows))
        });
        let instances = InstanceOrchestrator::new(resolver.clone(), self.instance_service, flows);

        ServiceBroker {
            resolver,
            instances,
            bindings,
        }
    }
}
