//! Lifecycle orchestration for service bindings.

use crate::enrich;
use crate::pipeline::{self, Outcome};
use crate::resolve::CatalogResolver;
use crate::response::BrokerResponse;
use service_broker_core::{
    BindingPath, CreateServiceInstanceBindingBody, CreateServiceInstanceBindingResponse,
    DeleteQuery, DeleteServiceInstanceBindingResponse, EventFlowRegistries,
    GetLastServiceBindingOperationResponse, GetServiceInstanceBindingResponse, Inbound,
    LastOperationQuery, OperationKind, ServiceInstanceBindingService,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Runs binding requests through catalog resolution, event flows, the
/// [`ServiceInstanceBindingService`] and status mapping.
#[derive(Clone)]
pub struct BindingOrchestrator {
    resolver: CatalogResolver,
    service: Arc<dyn ServiceInstanceBindingService>,
    flows: Arc<EventFlowRegistries>,
}

impl BindingOrchestrator {
    /// Create an orchestrator.
    #[must_use]
    pub fn new(
        resolver: CatalogResolver,
        service: Arc<dyn ServiceInstanceBindingService>,
        flows: Arc<EventFlowRegistries>,
    ) -> Self {
        Self {
            resolver,
            service,
            flows,
        }
    }

    /// `PUT /v2/service_instances/:instance_id/service_bindings/:binding_id`
    pub async fn create_service_instance_binding(
        &self,
        inbound: Inbound<BindingPath, CreateServiceInstanceBindingBody>,
    ) -> BrokerResponse<CreateServiceInstanceBindingResponse> {
        let operation = OperationKind::CreateBinding;
        let span = tracing::info_span!(
            "create_service_instance_binding",
            service_instance_id = %inbound.path.service_instance_id,
            binding_id = %inbound.path.binding_id,
            service_definition_id = %inbound.body.service_id,
            plan_id = %inbound.body.plan_id,
        );
        let started = Instant::now();

        async move {
            let outcome: Outcome<CreateServiceInstanceBindingResponse> = async {
                let (definition, plan) = self
                    .resolver
                    .require(&inbound.body.service_id, &inbound.body.plan_id)
                    .await?;
                let request = enrich::create_binding(inbound, definition, plan);

                pipeline::run_with_flows(operation, &self.flows.create_binding, &request, || {
                    self.service.create_service_instance_binding(&request)
                })
                .await
            }
            .await;

            pipeline::respond(operation, started, outcome)
        }
        .instrument(span)
        .await
    }

    /// `DELETE /v2/service_instances/:instance_id/service_bindings/:binding_id`
    ///
    /// A service definition missing from the catalog does not fail the request.
    pub async fn delete_service_instance_binding(
        &self,
        inbound: Inbound<BindingPath, DeleteQuery>,
    ) -> BrokerResponse<DeleteServiceInstanceBindingResponse> {
        let operation = OperationKind::DeleteBinding;
        let span = tracing::info_span!(
            "delete_service_instance_binding",
            service_instance_id = %inbound.path.service_instance_id,
            binding_id = %inbound.path.binding_id,
            service_definition_id = %inbound.body.service_id,
            plan_id = %inbound.body.plan_id,
        );
        let started = Instant::now();

        async move {
            let (definition, plan) = self
                .resolver
                .tolerate(&inbound.body.service_id, &inbound.body.plan_id)
                .await;
            let request = enrich::delete_binding(inbound, definition, plan);

            let outcome =
                pipeline::run_with_flows(operation, &self.flows.delete_binding, &request, || {
                    self.service.delete_service_instance_binding(&request)
                })
                .await;

            pipeline::respond(operation, started, outcome)
        }
        .instrument(span)
        .await
    }

    /// `GET /v2/service_instances/:instance_id/service_bindings/:binding_id`
    ///
    /// No catalog lookup and no event flows.
    pub async fn get_service_instance_binding(
        &self,
        inbound: Inbound<BindingPath, ()>,
    ) -> BrokerResponse<GetServiceInstanceBindingResponse> {
        let operation = OperationKind::GetBinding;
        let span = tracing::info_span!(
            "get_service_instance_binding",
            service_instance_id = %inbound.path.service_instance_id,
            binding_id = %inbound.path.binding_id,
        );
        let started = Instant::now();

        async move {
            let request = enrich::get_binding(inbound);
            let outcome = self.service.get_service_instance_binding(&request).await;
            pipeline::respond(operation, started, outcome)
        }
        .instrument(span)
        .await
    }

    /// `GET .../service_bindings/:binding_id/last_operation`
    pub async fn get_last_operation(
        &self,
        inbound: Inbound<BindingPath, LastOperationQuery>,
    ) -> BrokerResponse<GetLastServiceBindingOperationResponse> {
        let operation = OperationKind::GetLastBindingOperation;
        let span = tracing::info_span!(
            "get_last_binding_operation",
            service_instance_id = %inbound.path.service_instance_id,
            binding_id = %inbound.path.binding_id,
            operation = ?inbound.body.operation,
        );
        let started = Instant::now();

        async move {
            let (definition, plan) = self
                .resolver
                .best_effort(
                    inbound.body.service_id.as_deref(),
                    inbound.body.plan_id.as_deref(),
                )
                .await;
            let request = enrich::last_binding_operation(inbound, definition, plan);

            let outcome = pipeline::run_with_flows(
                operation,
                &self.flows.async_binding_operation,
                &request,
                || self.service.get_last_operation(&request),
            )
            .await;

            pipeline::respond(operation, started, outcome)
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for BindingOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingOrchestrator")
            .field("resolver", &self.resolver)
            .field("flows", &self.flows)
            .finish_non_exhaustive()
    }
}
