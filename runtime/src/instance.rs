//! Lifecycle orchestration for service instances.

use crate::enrich;
use crate::pipeline::{self, Outcome};
use crate::resolve::CatalogResolver;
use crate::response::BrokerResponse;
use service_broker_core::{
    CreateServiceInstanceBody, CreateServiceInstanceResponse, DeleteQuery,
    DeleteServiceInstanceResponse, EventFlowRegistries, GetLastServiceOperationResponse,
    GetServiceInstanceResponse, Inbound, InstancePath, LastOperationQuery, OperationKind,
    ServiceInstanceService, UpdateServiceInstanceBody, UpdateServiceInstanceResponse,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

/// Runs instance requests through catalog resolution, event flows, the
/// [`ServiceInstanceService`] and status mapping.
///
/// Stateless apart from the catalog, service and flows it was built with; share
/// it behind an `Arc` across concurrent requests.
#[derive(Clone)]
pub struct InstanceOrchestrator {
    resolver: CatalogResolver,
    service: Arc<dyn ServiceInstanceService>,
    flows: Arc<EventFlowRegistries>,
}

impl InstanceOrchestrator {
    /// Create an orchestrator.
    #[must_use]
    pub fn new(
        resolver: CatalogResolver,
        service: Arc<dyn ServiceInstanceService>,
        flows: Arc<EventFlowRegistries>,
    ) -> Self {
        Self {
            resolver,
            service,
            flows,
        }
    }

    /// `PUT /v2/service_instances/:instance_id`
    pub async fn create_service_instance(
        &self,
        inbound: Inbound<InstancePath, CreateServiceInstanceBody>,
    ) -> BrokerResponse<CreateServiceInstanceResponse> {
        let operation = OperationKind::CreateInstance;
        let span = tracing::info_span!(
            "create_service_instance",
            service_instance_id = %inbound.path.service_instance_id,
            service_definition_id = %inbound.body.service_id,
            plan_id = %inbound.body.plan_id,
        );
        let started = Instant::now();

        async move {
            let outcome: Outcome<CreateServiceInstanceResponse> = async {
                let (definition, plan) = self
                    .resolver
                    .require(&inbound.body.service_id, &inbound.body.plan_id)
                    .await?;
                let request = enrich::create_instance(inbound, definition, plan);

                pipeline::run_with_flows(operation, &self.flows.create_instance, &request, || {
                    self.service.create_service_instance(&request)
                })
                .await
            }
            .await;

            pipeline::respond(operation, started, outcome)
        }
        .instrument(span)
        .await
    }

    /// `PATCH /v2/service_instances/:instance_id`
    pub async fn update_service_instance(
        &self,
        inbound: Inbound<InstancePath, UpdateServiceInstanceBody>,
    ) -> BrokerResponse<UpdateServiceInstanceResponse> {
        let operation = OperationKind::UpdateInstance;
        let span = tracing::info_span!(
            "update_service_instance",
            service_instance_id = %inbound.path.service_instance_id,
            service_definition_id = %inbound.body.service_id,
            plan_id = ?inbound.body.plan_id,
        );
        let started = Instant::now();

        async move {
            let outcome: Outcome<UpdateServiceInstanceResponse> = async {
                let definition = self
                    .resolver
                    .require_definition(&inbound.body.service_id)
                    .await?;
                let plan = inbound
                    .body
                    .plan_id
                    .as_deref()
                    .map(|plan_id| self.resolver.require_plan(&definition, plan_id))
                    .transpose()?;
                let request = enrich::update_instance(inbound, definition, plan);

                pipeline::run_with_flows(operation, &self.flows.update_instance, &request, || {
                    self.service.update_service_instance(&request)
                })
                .await
            }
            .await;

            pipeline::respond(operation, started, outcome)
        }
        .instrument(span)
        .await
    }

    /// `DELETE /v2/service_instances/:instance_id`
    ///
    /// A service definition missing from the catalog does not fail the request.
    pub async fn delete_service_instance(
        &self,
        inbound: Inbound<InstancePath, DeleteQuery>,
    ) -> BrokerResponse<DeleteServiceInstanceResponse> {
        let operation = OperationKind::DeleteInstance;
        let span = tracing::info_span!(
            "delete_service_instance",
            service_instance_id = %inbound.path.service_instance_id,
            service_definition_id = %inbound.body.service_id,
            plan_id = %inbound.body.plan_id,
        );
        let started = Instant::now();

        async move {
            let (definition, plan) = self
                .resolver
                .tolerate(&inbound.body.service_id, &inbound.body.plan_id)
                .await;
            let request = enrich::delete_instance(inbound, definition, plan);

            let outcome =
                pipeline::run_with_flows(operation, &self.flows.delete_instance, &request, || {
                    self.service.delete_service_instance(&request)
                })
                .await;

            pipeline::respond(operation, started, outcome)
        }
        .instrument(span)
        .await
    }

    /// `GET /v2/service_instances/:instance_id`
    ///
    /// No catalog lookup and no event flows.
    pub async fn get_service_instance(
        &self,
        inbound: Inbound<InstancePath, ()>,
    ) -> BrokerResponse<GetServiceInstanceResponse> {
        let operation = OperationKind::GetInstance;
        let span = tracing::info_span!(
            "get_service_instance",
            service_instance_id = %inbound.path.service_instance_id,
        );
        let started = Instant::now();

        async move {
            let request = enrich::get_instance(inbound);
            let outcome = self.service.get_service_instance(&request).await;
            pipeline::respond(operation, started, outcome)
        }
        .instrument(span)
        .await
    }

    /// `GET /v2/service_instances/:instance_id/last_operation`
    pub async fn get_last_operation(
        &self,
        inbound: Inbound<InstancePath, LastOperationQuery>,
    ) -> BrokerResponse<GetLastServiceOperationResponse> {
        let operation = OperationKind::GetLastOperation;
        let span = tracing::info_span!(
            "get_last_operation",
            service_instance_id = %inbound.path.service_instance_id,
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
            let request = enrich::last_operation(inbound, definition, plan);

            let outcome =
                pipeline::run_with_flows(operation, &self.flows.async_operation, &request, || {
                    self.service.get_last_operation(&request)
                })
                .await;

            pipeline::respond(operation, started, outcome)
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for InstanceOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceOrchestrator")
            .field("resolver", &self.resolver)
            .field("flows", &self.flows)
            .finish_non_exhaustive()
    }
}
