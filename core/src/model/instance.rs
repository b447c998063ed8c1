//! Service instance requests and responses.

use super::envelope::RequestEnvelope;
use super::operation::OperationState;
use super::Parameterized;
use crate::catalog::{Plan, ServiceDefinition};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

// ============================================================================
// Provision
// ============================================================================

/// Body of `PUT /v2/service_instances/:instance_id`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CreateServiceInstanceBody {
    /// `service_id`
    pub service_id: String,
    /// `plan_id`
    pub plan_id: String,
    /// Deprecated Cloud Foundry organization GUID
    #[serde(default)]
    pub organization_guid: Option<String>,
    /// Deprecated Cloud Foundry space GUID
    #[serde(default)]
    pub space_guid: Option<String>,
    /// Platform-specific context
    #[serde(default)]
    pub context: Option<Map<String, Value>>,
    /// Opaque provisioning parameters
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

/// A provisioning request, enriched with its catalog entries.
#[derive(Debug, Clone)]
pub struct CreateServiceInstanceRequest {
    /// Instance id chosen by the platform
    pub service_instance_id: String,
    /// `service_id` from the body
    pub service_definition_id: String,
    /// `plan_id` from the body
    pub plan_id: String,
    /// Deprecated Cloud Foundry organization GUID
    pub organization_guid: Option<String>,
    /// Deprecated Cloud Foundry space GUID
    pub space_guid: Option<String>,
    /// Platform-specific context
    pub context: Option<Map<String, Value>>,
    /// Opaque provisioning parameters
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

impl Parameterized for CreateServiceInstanceRequest {
    fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }
}

/// Result of provisioning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateServiceInstanceResponse {
    /// Provisioning continues asynchronously
    #[serde(skip)]
    pub is_async: bool,
    /// An identical instance already existed
    #[serde(skip)]
    pub instance_existed: bool,
    /// URL of a web dashboard for the instance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
    /// Operation identifier for `last_operation` polls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    /// Instance metadata (labels, attributes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

// ============================================================================
// Update
// ============================================================================

/// Values of the instance before the update, as known to the platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousValues {
    /// Previous `service_id`
    #[serde(default)]
    pub service_id: Option<String>,
    /// Previous `plan_id`
    #[serde(default)]
    pub plan_id: Option<String>,
    /// Deprecated previous organization id
    #[serde(default)]
    pub organization_id: Option<String>,
    /// Deprecated previous space id
    #[serde(default)]
    pub space_id: Option<String>,
}

/// Body of `PATCH /v2/service_instances/:instance_id`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UpdateServiceInstanceBody {
    /// `service_id`
    pub service_id: String,
    /// New `plan_id`, when the plan changes
    #[serde(default)]
    pub plan_id: Option<String>,
    /// Values before the update
    #[serde(default)]
    pub previous_values: Option<PreviousValues>,
    /// Platform-specific context
    #[serde(default)]
    pub context: Option<Map<String, Value>>,
    /// Opaque update parameters
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

/// An update request, enriched with its catalog entries.
#[derive(Debug, Clone)]
pub struct UpdateServiceInstanceRequest {
    /// Instance id chosen by the platform
    pub service_instance_id: String,
    /// `service_id` from the body
    pub service_definition_id: String,
    /// `plan_id` from the body
    pub plan_id: Option<String>,
    /// Values before the update
    pub previous_values: Option<PreviousValues>,
    /// Platform-specific context
    pub context: Option<Map<String, Value>>,
    /// Opaque update parameters
    pub parameters: Map<String, Value>,
    /// Resolved service definition
    pub service_definition: Arc<ServiceDefinition>,
    /// Resolved plan, when `plan_id` was given
    pub plan: Option<Arc<Plan>>,
    /// Whether the platform accepts an asynchronous response
    pub async_accepted: bool,
    /// Common envelope
    pub envelope: RequestEnvelope,
}

impl Parameterized for UpdateServiceInstanceRequest {
    fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }
}

/// Result of an update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateServiceInstanceResponse {
    /// The update continues asynchronously
    #[serde(skip)]
    pub is_async: bool,
    /// URL of a web dashboard for the instance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
    /// Operation identifier for `last_operation` polls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

// ============================================================================
// Deprovision
// ============================================================================

/// A deprovisioning request.
///
/// The service definition is a placeholder when `service_id` is no longer in the
/// catalog, so orphaned instances can still be cleaned up.
#[derive(Debug, Clone)]
pub struct DeleteServiceInstanceRequest {
    /// Instance id chosen by the platform
    pub service_instance_id: String,
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

/// Result of deprovisioning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeleteServiceInstanceResponse {
    /// Deprovisioning continues asynchronously
    #[serde(skip)]
    pub is_async: bool,
    /// Operation identifier for `last_operation` polls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
}

// ============================================================================
// Fetch
// ============================================================================

/// A request to fetch a service instance.
#[derive(Debug, Clone)]
pub struct GetServiceInstanceRequest {
    /// Instance id chosen by the platform
    pub service_instance_id: String,
    /// Common envelope
    pub envelope: RequestEnvelope,
}

/// A fetched service instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetServiceInstanceResponse {
    /// Service definition id of the instance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    /// Plan id of the instance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    /// URL of a web dashboard for the instance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
    /// Parameters used to provision the instance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
}

// ============================================================================
// Last operation
// ============================================================================

/// A `last_operation` poll for a service instance.
#[derive(Debug, Clone)]
pub struct GetLastServiceOperationRequest {
    /// Instance id chosen by the platform
    pub service_instance_id: String,
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

/// State of the last operation on a service instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetLastServiceOperationResponse {
    /// Current state
    pub state: OperationState,
    /// Human-readable progress description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The polled operation was a deprovision
    #[serde(skip)]
    pub delete_operation: bool,
    /// Whether the instance is still usable after a failed update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_usable: Option<bool>,
    /// Whether a failed update can be repeated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_repeatable: Option<bool>,
}

impl GetLastServiceOperationResponse {
    /// Response with the given state and nothing else.
    #[must_use]
    pub fn with_state(state: OperationState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }
}
