//! Service instance endpoints.
//!
//! ```text
//! PUT    /v2/service_instances/:instance_id
//! PATCH  /v2/service_instances/:instance_id
//! DELETE /v2/service_instances/:instance_id?service_id=..&plan_id=..
//! GET    /v2/service_instances/:instance_id
//! GET    /v2/service_instances/:instance_id/last_operation
//! ```

use super::{inbound, instance_path, Reply};
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
    CreateServiceInstanceBody, CreateServiceInstanceResponse, DeleteQuery,
    DeleteServiceInstanceResponse, GetLastServiceOperationResponse, GetServiceInstanceResponse,
    LastOperationQuery, UpdateServiceInstanceBody, UpdateServiceInstanceResponse,
};
use std::collections::HashMap;

/// Provision a service instance.
///
/// # Errors
///
/// Returns 422 if the body is not a valid provision request.
pub async fn create_service_instance(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    accepts_incomplete: AcceptsIncomplete,
    envelope: BrokerEnvelope,
    body: Result<Json<CreateServiceInstanceBody>, JsonRejection>,
) -> WebResult<Reply<CreateServiceInstanceResponse>> {
    let Json(body) = body?;
    let inbound = inbound(instance_path(&params)?, accepts_incomplete, envelope, body);

    Ok(Reply(state.broker().instances().create_service_instance(inbound).await))
}

/// Update a service instance.
///
/// # Errors
///
/// Returns 422 if the body is not a valid update request.
pub async fn update_service_instance(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    accepts_incomplete: AcceptsIncomplete,
    envelope: BrokerEnvelope,
    body: Result<Json<UpdateServiceInstanceBody>, JsonRejection>,
) -> WebResult<Reply<UpdateServiceInstanceResponse>> {
    let Json(body) = body?;
    let inbound = inbound(instance_path(&params)?, accepts_incomplete, envelope, body);

    Ok(Reply(state.broker().instances().update_service_instance(inbound).await))
}

/// Deprovision a service instance.
///
/// # Errors
///
/// Returns 422 if `service_id` or `plan_id` is missing from the query.
pub async fn delete_service_instance(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    accepts_incomplete: AcceptsIncomplete,
    envelope: BrokerEnvelope,
    query: Result<Query<DeleteQuery>, QueryRejection>,
) -> WebResult<Reply<DeleteServiceInstanceResponse>> {
    let Query(query) = query?;
    let inbound = inbound(instance_path(&params)?, accepts_incomplete, envelope, query);

    Ok(Reply(state.broker().instances().delete_service_instance(inbound).await))
}

/// Fetch a service instance.
///
/// # Errors
///
/// Only fails on a misconfigured route.
pub async fn get_service_instance(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    envelope: BrokerEnvelope,
) -> WebResult<Reply<GetServiceInstanceResponse>> {
    let inbound = inbound(instance_path(&params)?, AcceptsIncomplete(false), envelope, ());

    Ok(Reply(state.broker().instances().get_service_instance(inbound).await))
}

/// Poll the last asynchronous operation on a service instance.
///
/// # Errors
///
/// Returns 422 if the query string cannot be parsed.
pub async fn get_last_operation(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    envelope: BrokerEnvelope,
    query: Result<Query<LastOperationQuery>, QueryRejection>,
) -> WebResult<Reply<GetLastServiceOperationResponse>> {
    let Query(query) = query?;
    let inbound = inbound(instance_path(&params)?, AcceptsIncomplete(false), envelope, query);

    Ok(Reply(state.broker().instances().get_last_operation(inbound).await))
}
