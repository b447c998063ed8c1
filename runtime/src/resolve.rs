//! Catalog resolution: the first pipeline stage.
//!
//! Create and update require every referenced entry to exist. Delete tolerates
//! missing entries so orphaned resources can be cleaned up. Polls resolve on a
//! best-effort basis.

use service_broker_core::{CatalogService, Plan, ServiceBrokerError, ServiceDefinition};
use std::sync::Arc;

/// Resolves service definition and plan ids against the catalog.
#[derive(Clone)]
pub struct CatalogResolver {
    catalog: Arc<dyn CatalogService>,
}

impl CatalogResolver {
    /// Create a resolver over a catalog.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogService>) -> Self {
        Self { catalog }
    }

    /// The underlying catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<dyn CatalogService> {
        &self.catalog
    }

    /// Resolve a service definition that must exist.
    ///
    /// # Errors
    ///
    /// [`ServiceBrokerError::CatalogNotFound`] if the id is unknown.
    pub async fn require_definition(
        &self,
        service_definition_id: &str,
    ) -> Result<Arc<ServiceDefinition>, ServiceBrokerError> {
        self.catalog
            .get_service_definition(service_definition_id)
            .await
            .ok_or_else(|| {
                tracing::debug!(service_definition_id, "Service definition not in catalog");
                ServiceBrokerError::service_definition_not_found(service_definition_id)
            })
    }

    /// Resolve a plan that must exist within `definition`.
    ///
    /// # Errors
    ///
    /// [`ServiceBrokerError::CatalogNotFound`] if the plan is not part of the definition.
    pub fn require_plan(
        &self,
        definition: &ServiceDefinition,
        plan_id: &str,
    ) -> Result<Arc<Plan>, ServiceBrokerError> {
        self.catalog.lookup_plan(definition, plan_id).ok_or_else(|| {
            tracing::debug!(
                service_definition_id = %definition.id,
                plan_id,
                "Plan not in catalog"
            );
            ServiceBrokerError::plan_not_found(plan_id)
        })
    }

    /// Resolve a definition and plan that must both exist.
    ///
    /// # Errors
    ///
    /// [`ServiceBrokerError::CatalogNotFound`] for whichever entry is missing first.
    pub async fn require(
        &self,
        service_definition_id: &str,
        plan_id: &str,
    ) -> Result<(Arc<ServiceDefinition>, Arc<Plan>), ServiceBrokerError> {
        let definition = self.require_definition(service_definition_id).await?;
        let plan = self.require_plan(&definition, plan_id)?;
        Ok((definition, plan))
    }

    /// Resolve entries for a delete.
    ///
    /// An unknown definition yields an empty placeholder; an unknown plan yields `None`.
    pub async fn tolerate(
        &self,
        service_definition_id: &str,
        plan_id: &str,
    ) -> (Arc<ServiceDefinition>, Option<Arc<Plan>>) {
        match self.catalog.get_service_definition(service_definition_id).await {
            Some(definition) => {
                let plan = self.catalog.lookup_plan(&definition, plan_id);
                (definition, plan)
            }
            None => {
                tracing::debug!(
                    service_definition_id,
                    "Service definition not in catalog; continuing with placeholder"
                );
                (Arc::new(ServiceDefinition::placeholder()), None)
            }
        }
    }

    /// Resolve optional ids for a `last_operation` poll.
    pub async fn best_effort(
        &self,
        service_definition_id: Option<&str>,
        plan_id: Option<&str>,
    ) -> (Option<Arc<ServiceDefinition>>, Option<Arc<Plan>>) {
        let Some(id) = service_definition_id else {
            return (None, None);
        };
        let definition = self.catalog.get_service_definition(id).await;
        let plan = definition
            .as_deref()
            .zip(plan_id)
            .and_then(|(definition, plan_id)| self.catalog.lookup_plan(definition, plan_id));
        (definition, plan)
    }
}

impl std::fmt::Debug for CatalogResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogResolver").finish_non_exhaustive()
    }
}
