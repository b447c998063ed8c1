//! HTTP request handlers.
//!
//! Each handler turns the parsed request into an [`Inbound`] value, hands it to
//! the orchestrator and renders the resulting [`BrokerResponse`] unchanged.

pub mod bindings;
pub mod catalog;
pub mod instances;

pub use catalog::get_catalog;

use crate::error::AppError;
use crate::extractors::{AcceptsIncomplete, BrokerEnvelope};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use service_broker_core::{BindingPath, Inbound, InstancePath};
use service_broker_runtime::BrokerResponse;
use std::collections::HashMap;

/// Path parameter holding the service instance id.
pub const INSTANCE_ID_PARAM: &str = "instance_id";

/// Path parameter holding the binding id.
pub const BINDING_ID_PARAM: &str = "binding_id";

/// Renders an orchestrator response as-is.
#[derive(Debug)]
pub struct Reply<T>(pub BrokerResponse<T>);

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        let Self(response) = self;
        match response.body.to_json() {
            Ok(body) => (response.status, Json(body)).into_response(),
            Err(e) => AppError::internal("Failed to serialize response")
                .with_source(e.into())
                .into_response(),
        }
    }
}

fn path_param(params: &HashMap<String, String>, name: &str) -> Result<String, AppError> {
    params.get(name).cloned().ok_or_else(|| {
        AppError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Route is missing path parameter '{name}'"),
        )
    })
}

pub(crate) fn instance_path(params: &HashMap<String, String>) -> Result<InstancePath, AppError> {
    Ok(InstancePath {
        service_instance_id: path_param(params, INSTANCE_ID_PARAM)?,
    })
}

pub(crate) fn binding_path(params: &HashMap<String, String>) -> Result<BindingPath, AppError> {
    Ok(BindingPath {
        service_instance_id: path_param(params, INSTANCE_ID_PARAM)?,
        binding_id: path_param(params, BINDING_ID_PARAM)?,
    })
}

/// Assemble the inbound request from the pieces every handler extracts.
pub(crate) fn inbound<P, B>(
    path: P,
    AcceptsIncomplete(accepts_incomplete): AcceptsIncomplete,
    BrokerEnvelope(envelope): BrokerEnvelope,
    body: B,
) -> Inbound<P, B> {
    Inbound::new(path, body)
        .accepts_incomplete(accepts_incomplete)
        .with_envelope(envelope)
}
