//! Service binding endpoints; mounted only when a binding service is configured.
//!
//! ```text
//! PUT    /v2/service_instances/:instance_id/service_bindings/:binding_id
//! DELETE /v2/service_instances/:instance_id/service_bindings/:binding_id?service_id=..&plan_id=..
//! GET    /v2/service_instances/:instance_id/service_bindings/:binding_id
//! GET    /v2/service_instances/:instance_id/service_bindings/:binding_id/last_operation
//! ```

use super::{binding_path, inbound, Reply};
use crate::error::AppError;
use crate::extractors::{AcceptsIncomplete, BrokerEnvelope};
use crate::state::AppState;
use crate::WebResult;
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use service_broker_core::{
    CreateServiceInstanceBindingBody, CreateServiceInstanceBindingResponse, DeleteQuery,
    DeleteServiceInstanceBindingResponse, GetLastServiceBindingOperationResponse,
    GetServiceInstanceBindingResponse, LastOperationQuery,
};
use service_broker_runtime::BindingOrchestrator;
use std::collections::HashMap;

fn bindings(state: &AppState) -> Result<&BindingOrchestrator, AppError> {
    state
        .broker()
        .bindings()
        .ok_or_else(|| AppError::internal("Binding operations are not configured"))
}

/// Create a service binding.
///
/// # Errors
///
/// Returns 422 if the body is not a valid bind request.
pub async fn create_service_instance_binding(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    accepts_incomplete: AcceptsIncomplete,
    envelope: BrokerEnvelope,
    body: Result<Json<CreateServiceInstanceBindingBody>, JsonRejection>,
) -> WebResult<Reply<CreateServiceInstanceBindingResponse>> {
    let Json(body) = body?;
    let inbound = inbound(binding_path(&params)?, accepts_incomplete, envelope, body);

    Ok(Reply(bindings(&state)?.create_service_instance_binding(inbound).await))
}

/// Delete a service binding.
///
/// # Errors
///
/// Returns 422 if `service_id` or `plan_id` is missing from the query.
pub async fn delete_service_instance_binding(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    accepts_incomplete: AcceptsIncomplete,
    envelope: BrokerEnvelope,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> WebResult<Reply<DeleteServiceInstanceBindingResponse>> {
    let Query(query) = query?;
    let inbound = inbound(binding_path(&params)?, accepts_incomplete, envelope, query);

    Ok(Reply(bindings(&state)?.delete_service_instance_binding(inbound).await))
}

/// Fetch a service binding.
///
/// # Errors
///
/// Only fails on a misconfigured route.
pub async fn get_service_instance_binding(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    envelope: BrokerEnvelope,
) -> WebResult<Reply<GetServiceInstanceBindingResponse>> {
    let inbound = inbound(binding_path(&params)?, AcceptsIncomplete(false), envelope, ());

    Ok(Reply(bindings(&state)?.get_service_instance_binding(inbound).await))
}

/// Poll the last asynchronous operation on a service binding.
///
/// # Errors
///
/// Returns 422 if the query string cannot be parsed.
pub async fn get_last_operation(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    envelope: BrokerEnvelope,
    query: Result<Query<LastOperationQuery>, QueryRejection>,
) -> WebResult<Reply<GetLastServiceBindingOperationResponse>> {
    let Query(query) = query?;
    let inbound = inbound(binding_path(&params)?, AcceptsIncomplete(false), envelope, query);

    Ok(Reply(bindings(&state)?.get_last_operation(inbound).await))
}
