//! Failure taxonomy for broker operations.
//!
//! Every stage of a request pipeline (catalog lookup, event flows, the business
//! service) reports failures as a [`ServiceBrokerError`]. The response mapper in
//! the runtime crate turns each variant into a protocol status code and error body,
//! so the variant chosen here decides what the platform sees.

use std::fmt;
use thiserror::Error;

/// Catalog entry kinds that can fail to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogEntry {
    /// A service definition (`service_id`)
    ServiceDefinition,
    /// A plan of a service definition (`plan_id`)
    Plan,
}

impl fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServiceDefinition => write!(f, "Service definition"),
            Self::Plan => write!(f, "Service definition plan"),
        }
    }
}

/// Resources owned by the broker implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// A provisioned service instance
    ServiceInstance,
    /// A binding to a service instance
    ServiceBinding,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServiceInstance => write!(f, "Service instance"),
            Self::ServiceBinding => write!(f, "Service instance binding"),
        }
    }
}

/// Event flow phase a hook failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    /// Hooks run before the business service
    Initialization,
    /// Hooks run after a successful business outcome
    Completion,
}

impl FlowPhase {
    /// Short lowercase label, used in logs and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initialization => "initialization",
            Self::Completion => "completion",
        }
    }
}

impl fmt::Display for FlowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while processing a broker request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceBrokerError {
    /// A service definition or plan referenced by the request is not in the catalog
    #[error("{entry} does not exist: id={id}")]
    CatalogNotFound {
        /// Which catalog entry failed to resolve
        entry: CatalogEntry,
        /// The identifier that was looked up
        id: String,
    },

    /// The instance or binding addressed by the request does not exist
    #[error("{resource} does not exist: id={id}")]
    ResourceDoesNotExist {
        /// The missing resource kind
        resource: Resource,
        /// Identifier of the missing resource
        id: String,
    },

    /// The instance or binding already exists with different attributes
    #[error("{resource} already exists: id={id}")]
    ResourceAlreadyExists {
        /// The conflicting resource kind
        resource: Resource,
        /// Identifier of the existing resource
        id: String,
    },

    /// An asynchronous operation on the resource has not finished yet
    #[error("Service broker operation is in progress for the requested service instance or binding{}",
        .operation.as_deref().map(|op| format!(": operation={op}")).unwrap_or_default())]
    OperationInProgress {
        /// Operation identifier previously returned to the platform
        operation: Option<String>,
    },

    /// The requested update cannot be applied to the instance
    #[error("Service instance update not supported: {0}")]
    UpdateNotSupported(String),

    /// Parameters supplied by the platform were rejected
    #[error("{0}")]
    InvalidParameters(String),

    /// The broker only supports this operation asynchronously
    #[error("{0}")]
    AsyncRequired(String),

    /// Another operation modified the resource concurrently
    #[error("{0}")]
    ConcurrencyError(String),

    /// An initialization or completion hook failed
    #[error("{phase} flow failed: {source}")]
    HookFailure {
        /// Phase the failing hook belongs to
        phase: FlowPhase,
        /// The failure reported by the hook
        source: Box<ServiceBrokerError>,
    },

    /// Any other failure
    #[error("{message}")]
    Unclassified {
        /// Human-readable message
        message: String,
        /// Machine-readable error code (single camel-case word)
        error_code: Option<String>,
        /// HTTP status the failure should map to, when not a server error
        status: Option<u16>,
    },
}

impl ServiceBrokerError {
    /// Service definition missing from the catalog.
    #[must_use]
    pub fn service_definition_not_found(id: impl Into<String>) -> Self {
        Self::CatalogNotFound {
            entry: CatalogEntry::ServiceDefinition,
            id: id.into(),
        }
    }

    /// Plan missing from its service definition.
    #[must_use]
    pub fn plan_not_found(id: impl Into<String>) -> Self {
        Self::CatalogNotFound {
            entry: CatalogEntry::Plan,
            id: id.into(),
        }
    }

    /// Service instance does not exist.
    #[must_use]
    pub fn instance_does_not_exist(id: impl Into<String>) -> Self {
        Self::ResourceDoesNotExist {
            resource: Resource::ServiceInstance,
            id: id.into(),
        }
    }

    /// Service binding does not exist.
    #[must_use]
    pub fn binding_does_not_exist(id: impl Into<String>) -> Self {
        Self::ResourceDoesNotExist {
            resource: Resource::ServiceBinding,
            id: id.into(),
        }
    }

    /// Service instance already exists.
    #[must_use]
    pub fn instance_exists(id: impl Into<String>) -> Self {
        Self::ResourceAlreadyExists {
            resource: Resource::ServiceInstance,
            id: id.into(),
        }
    }

    /// Service binding already exists.
    #[must_use]
    pub fn binding_exists(id: impl Into<String>) -> Self {
        Self::ResourceAlreadyExists {
            resource: Resource::ServiceBinding,
            id: id.into(),
        }
    }

    /// Operation still in progress.
    #[must_use]
    pub const fn operation_in_progress(operation: Option<String>) -> Self {
        Self::OperationInProgress { operation }
    }

    /// Unclassified failure with only a message; maps to a server error.
    #[must_use]
    pub fn unclassified(message: impl Into<String>) -> Self {
        Self::Unclassified {
            message: message.into(),
            error_code: None,
            status: None,
        }
    }

    /// Unclassified failure carrying an explicit status code.
    #[must_use]
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self::Unclassified {
            message: message.into(),
            error_code: None,
            status: Some(status),
        }
    }

    /// Wrap a hook failure with the phase it came from.
    #[must_use]
    pub fn hook(phase: FlowPhase, source: Self) -> Self {
        Self::HookFailure {
            phase,
            source: Box::new(source),
        }
    }

    /// The failure that decides the response: hook wrappers are unwrapped.
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::HookFailure { source, .. } => source.root(),
            other => other,
        }
    }

    /// Stable label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CatalogNotFound { .. } => "catalog_not_found",
            Self::ResourceDoesNotExist { .. } => "resource_does_not_exist",
            Self::ResourceAlreadyExists { .. } => "resource_already_exists",
            Self::OperationInProgress { .. } => "operation_in_progress",
            Self::UpdateNotSupported(_) => "update_not_supported",
            Self::InvalidParameters(_) => "invalid_parameters",
            Self::AsyncRequired(_) => "async_required",
            Self::ConcurrencyError(_) => "concurrency_error",
            Self::HookFailure { .. } => "hook_failure",
            Self::Unclassified { .. } => "unclassified",
        }
    }
}

/// Result type alias for broker operations.
pub type Result<T> = std::result::Result<T, ServiceBrokerError>;
