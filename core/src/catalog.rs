//! Service catalog: the services and plans a broker offers.
//!
//! The catalog is loaded once at startup and never mutated. Definitions and plans
//! are handed out as `Arc`s, so a request enriched with catalog entries holds the
//! very values the catalog returned rather than copies.
//!
//! # Example
//!
//! ```
//! use service_broker_core::catalog::{Catalog, CatalogService, InMemoryCatalog, Plan, ServiceDefinition};
//!
//! let catalog = Catalog::new(vec![ServiceDefinition::new("sd-1", "mysql", "MySQL databases")
//!     .with_plan(Plan::new("plan-1", "small", "A small database"))]);
//! let service = InMemoryCatalog::new(catalog);
//!
//! let definition = futures::executor::block_on(service.get_service_definition("sd-1"));
//! assert!(definition.is_some());
//! ```

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// JSON schema describing the parameters accepted by one operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodSchema {
    /// JSON schema object for the `parameters` field
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

/// Schemas for service instance operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceInstanceSchema {
    /// Schema for provisioning parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create: Option<MethodSchema>,
    /// Schema for update parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<MethodSchema>,
}

/// Schemas for service binding operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceBindingSchema {
    /// Schema for binding parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create: Option<MethodSchema>,
}

/// Parameter schemas attached to a plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schemas {
    /// Instance operation schemas
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_instance: Option<ServiceInstanceSchema>,
    /// Binding operation schemas
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_binding: Option<ServiceBindingSchema>,
}

/// A plan offered by a service definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Plan identifier, unique within the catalog
    pub id: String,
    /// CLI-friendly plan name
    pub name: String,
    /// Short description
    pub description: String,
    /// Opaque metadata for display purposes
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Overrides the service-level `bindable` flag when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bindable: Option<bool>,
    /// Whether the plan is free of charge
    #[serde(default = "default_free")]
    pub free: bool,
    /// Parameter schemas
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemas: Option<Schemas>,
}

const fn default_free() -> bool {
    true
}

impl Plan {
    /// Create a free plan with no metadata or schemas.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            metadata: Map::new(),
            bindable: None,
            free: true,
            schemas: None,
        }
    }

    /// Set the free flag.
    #[must_use]
    pub const fn with_free(mut self, free: bool) -> Self {
        self.free = free;
        self
    }

    /// Override the service-level bindable flag.
    #[must_use]
    pub const fn with_bindable(mut self, bindable: bool) -> Self {
        self.bindable = Some(bindable);
        self
    }

    /// Attach parameter schemas.
    #[must_use]
    pub fn with_schemas(mut self, schemas: Schemas) -> Self {
        self.schemas = Some(schemas);
        self
    }
}

/// A service offered by the broker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    /// Service identifier, unique within the catalog
    pub id: String,
    /// CLI-friendly service name
    pub name: String,
    /// Short description
    pub description: String,
    /// Whether instances of this service can be bound
    #[serde(default)]
    pub bindable: bool,
    /// Whether instances support plan changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_updateable: Option<bool>,
    /// Whether `GET /v2/service_instances/:id` is supported
    #[serde(default)]
    pub instances_retrievable: bool,
    /// Whether `GET .../service_bindings/:id` is supported
    #[serde(default)]
    pub bindings_retrievable: bool,
    /// Tags for filtering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Opaque metadata for display purposes
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Plans, in catalog order
    #[serde(default)]
    pub plans: Vec<Arc<Plan>>,
}

impl ServiceDefinition {
    /// Create a non-bindable definition without plans.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Placeholder used for deletes whose service definition is no longer in the catalog.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::default()
    }

    /// Mark the service as bindable.
    #[must_use]
    pub const fn with_bindable(mut self, bindable: bool) -> Self {
        self.bindable = bindable;
        self
    }

    /// Append a plan.
    #[must_use]
    pub fn with_plan(mut self, plan: Plan) -> Self {
        self.plans.push(Arc::new(plan));
        self
    }

    /// Find a plan by id.
    #[must_use]
    pub fn plan(&self, plan_id: &str) -> Option<Arc<Plan>> {
        self.plans.iter().find(|plan| plan.id == plan_id).cloned()
    }
}

/// The full catalog served at `GET /v2/catalog`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Offered services
    pub services: Vec<Arc<ServiceDefinition>>,
}

impl Catalog {
    /// Build a catalog from service definitions.
    #[must_use]
    pub fn new(services: Vec<ServiceDefinition>) -> Self {
        Self {
            services: services.into_iter().map(Arc::new).collect(),
        }
    }
}

/// Read access to the catalog.
///
/// Implementations must be cheap to share across concurrent requests; the
/// orchestrator holds one `Arc<dyn CatalogService>` for its whole lifetime.
///
/// Note: Returns `BoxFuture` instead of async fn to stay dyn-compatible.
pub trait CatalogService: Send + Sync {
    /// Get the full catalog.
    fn get_catalog(&self) -> BoxFuture<'_, Arc<Catalog>>;

    /// Look up a service definition by id.
    fn get_service_definition<'a>(
        &'a self,
        service_definition_id: &'a str,
    ) -> BoxFuture<'a, Option<Arc<ServiceDefinition>>>;

    /// Look up a plan within a service definition.
    fn lookup_plan(&self, service_definition: &ServiceDefinition, plan_id: &str) -> Option<Arc<Plan>> {
        service_definition.plan(plan_id)
    }
}

/// Catalog held entirely in memory, indexed by service id.
#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    catalog: Arc<Catalog>,
    by_id: HashMap<String, Arc<ServiceDefinition>>,
}

impl InMemoryCatalog {
    /// Index the given catalog.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        let by_id = catalog
            .services
            .iter()
            .map(|definition| (definition.id.clone(), Arc::clone(definition)))
            .collect();

        Self {
            catalog: Arc::new(catalog),
            by_id,
        }
    }
}

impl CatalogService for InMemoryCatalog {
    fn get_catalog(&self) -> BoxFuture<'_, Arc<Catalog>> {
        let catalog = Arc::clone(&self.catalog);
        Box::pin(async move { catalog })
    }

    fn get_service_definition<'a>(
        &'a self,
        service_definition_id: &'a str,
    ) -> BoxFuture<'a, Option<Arc<ServiceDefinition>>> {
        Box::pin(async move { self.by_id.get(service_definition_id).cloned() })
    }
}
