//! Service binding requests and responses.

use super::envelope::RequestEnvelope;
use super::operation::OperationState;
use super::Parameterized;
use crate::catalog::{Plan, ServiceDefinition};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Resource the binding is created for (an application or a route).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindResource {
    /// Application GUID for application bindings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_guid: Option<String>,
    /// Route URL for route-service bindings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,
}

/// Body of `PUT .../service_bindings/:binding_id`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CreateServiceInstanceBindingBody {
    /// `service_id`
    pub service_id: String,
    /// `plan_id`
    pub plan_id: String,
    /// Deprecated application GUID
    #[serde(default)]
    pub app_guid: Option<String>,
    /// Bound resource
    #[serde(default)]
    pub bind_resource: Option<BindResource>,
    /// Platform-specific context
    #[serde(default)]
    pub context: Option<Map<String, Value>>,
    /// Opaque binding parameters
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

/// A binding request, enriched with its catalog entries.
#[derive(Debug, Clone)]
pub struct CreateServiceInstanceBindingRequest {
    /// Instance being bound
    pub service_instance_id: String,
    /// Binding id chosen by the platform
    pub binding_id: String,
    /// `service_id` from the body
    pub service_definition_id: String,
    /// `plan_id` from the body
    pub plan_id: String,
    /// Deprecated application GUID
    pub app_guid: Option<String>,
    /// Bound resource
    pub bind_resource: Option<BindResource>,
    /// Platform-specific context
    pub context: Option<Map<String, Value>>,
    /// Opaque binding parameters
    pub parameters: Map<String, Value>,
    /// Resolved service definition
    pub service_definition: Arc<ServiceDefinition>,
    /// Resolved plan
    pub plan: Arc<Plan>,
    /// Whether the platform accepts an asynchronous response
    pub async_accepted: bool,
    /// Common envelope
    pub envelope: RequestEnvelope,
}

impl Parameterized for CreateServiceInstanceBindingRequest {
    fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }
}

/// A volume mount returned for volume-service bindings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeMount {
    /// Volume driver name
    pub driver: String,
    /// Mount path inside the application container
    pub container_dir: String,
    /// `r` or `rw`
    pub mode: String,
    /// `shared`
    pub device_type: String,
    /// Driver-specific device description
    pub device: Map<String, Value>,
}

/// Result of binding. Covers application, route and volume bindings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateServiceInstanceBindingResponse {
    /// Binding continues asynchronously
    #[serde(skip)]
    pub is_async: bool,
    /// An identical binding already existed
    #[serde(skip)]
    pub binding_existed: bool,
    /// Credentials handed to the application
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Map<String, Value>>,
    /// URL to which logs are streamed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syslog_drain_url: Option<String>,
    /// URL of a route service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_service_url: Option<String>,
    /// Volume mounts
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub volume_mounts: Vec<VolumeMount>,
    /// Operation identifier for `last_operation` polls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

/// An unbinding request.
#[derive(Debug, Clone)]
pub struct DeleteServiceInstanceBindingRequest {
    /// Instance the binding belongs to
    pub service_instance_id: String,
    /// Binding id chosen by the platform
    pub binding_id: String,
    /// `service_id` query parameter
    pub service_definition_id: String,
    /// `plan_id` query parameter
    pub plan_id: String,
    /// Resolved service definition, or a placeholder
    pub service_definition: Arc<ServiceDefinition>,
    /// Resolved plan, when found
    pub plan: Option<Arc<Plan>>,
    /// Whether the platform accepts an asynchronous response
    pub async_accepted: bool,
    /// Common envelope
    pub envelope: RequestEnvelope,
}

/// Result of unbinding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteServiceInstanceBindingResponse {
    /// Unbinding continues asynchronously
    #[serde(skip)]
    pub is_async: bool,
    /// Operation identifier for `last_operation` polls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

/// A request to fetch a binding.
#[derive(Debug, Clone)]
pub struct GetServiceInstanceBindingRequest {
    /// Instance the binding belongs to
    pub service_instance_id: String,
    /// Binding id chosen by the platform
    pub binding_id: String,
    /// Common envelope
    pub envelope: RequestEnvelope,
}

/// A fetched binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetServiceInstanceBindingResponse {
    /// Credentials handed to the application
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Map<String, Value>>,
    /// URL to which logs are streamed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syslog_drain_url: Option<String>,
    /// URL of a route service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_service_url: Option<String>,
    /// Volume mounts
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub volume_mounts: Vec<VolumeMount>,
    /// Parameters used to create the binding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
}

/// A `last_operation` poll for a binding.
#[derive(Debug, Clone)]
pub struct GetLastServiceBindingOperationRequest {
    /// Instance the binding belongs to
    pub service_instance_id: String,
    /// Binding id chosen by the platform
    pub binding_id: String,
    /// Optional `service_id` query parameter
    pub service_definition_id: Option<String>,
    /// Optional `plan_id` query parameter
    pub plan_id: Option<String>,
    /// Optional `operation` query parameter
    pub operation: Option<String>,
    /// Resolved service definition, when found
    pub service_definition: Option<Arc<ServiceDefinition>>,
    /// Resolved plan, when found
    pub plan: Option<Arc<Plan>>,
    /// Common envelope
    pub envelope: RequestEnvelope,
}

/// State of the last operation on a binding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetLastServiceBindingOperationResponse {
    /// Current state
    pub state: OperationState,
    /// Human-readable progress description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The polled operation was an unbind
    #[serde(skip)]
    pub delete_operation: bool,
}

impl GetLastServiceBindingOperationResponse {
    /// Response with the given state and nothing else.
    #[must_use]
    pub fn with_state(state: OperationState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }
}
