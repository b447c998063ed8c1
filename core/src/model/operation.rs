//! Operation kinds and asynchronous operation state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Every protocol operation the orchestrator handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// `PUT /v2/service_instances/:instance_id`
    CreateInstance,
    /// `PATCH /v2/service_instances/:instance_id`
    UpdateInstance,
    /// `DELETE /v2/service_instances/:instance_id`
    DeleteInstance,
    /// `GET /v2/service_instances/:instance_id`
    GetInstance,
    /// `GET /v2/service_instances/:instance_id/last_operation`
    GetLastOperation,
    /// `PUT .../service_bindings/:binding_id`
    CreateBinding,
    /// `DELETE .../service_bindings/:binding_id`
    DeleteBinding,
    /// `GET .../service_bindings/:binding_id`
    GetBinding,
    /// `GET .../service_bindings/:binding_id/last_operation`
    GetLastBindingOperation,
}

impl OperationKind {
    /// Snake-case label used in spans and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateInstance => "create_instance",
            Self::UpdateInstance => "update_instance",
            Self::DeleteInstance => "delete_instance",
            Self::GetInstance => "get_instance",
            Self::GetLastOperation => "get_last_operation",
            Self::CreateBinding => "create_binding",
            Self::DeleteBinding => "delete_binding",
            Self::GetBinding => "get_binding",
            Self::GetLastBindingOperation => "get_last_binding_operation",
        }
    }

    /// Whether the operation deletes a resource.
    #[must_use]
    pub const fn is_delete(self) -> bool {
        matches!(self, Self::DeleteInstance | Self::DeleteBinding)
    }

    /// Whether the operation reads a resource.
    #[must_use]
    pub const fn is_get(self) -> bool {
        matches!(self, Self::GetInstance | Self::GetBinding)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of an asynchronous operation as reported by `last_operation`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationState {
    /// The operation is still running
    #[default]
    #[serde(rename = "in progress")]
    InProgress,
    /// The operation finished successfully
    #[serde(rename = "succeeded")]
    Succeeded,
    /// The operation failed
    #[serde(rename = "failed")]
    Failed,
}
