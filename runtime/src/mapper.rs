//! Response code mapping.
//!
//! Pure decision tables from an operation's outcome to a protocol status code and
//! body. Success statuses come from [`ResponseStatus`]; failures go through
//! [`failure_status`] and [`error_message`]. Hook failures are classified by the
//! failure they wrap.

use crate::response::{BrokerResponse, ErrorMessage};
use http::StatusCode;
use service_broker_core::{
    CreateServiceInstanceBindingResponse, CreateServiceInstanceResponse,
    DeleteServiceInstanceBindingResponse, DeleteServiceInstanceResponse,
    GetLastServiceBindingOperationResponse, GetLastServiceOperationResponse,
    GetServiceInstanceBindingResponse, GetServiceInstanceResponse, OperationKind, OperationState,
    Resource, ServiceBrokerError, UpdateServiceInstanceResponse,
};

/// Error code sent with `AsyncRequired` failures.
pub const ASYNC_REQUIRED_ERROR: &str = "AsyncRequired";

/// Error code sent with `ConcurrencyError` failures.
pub const CONCURRENCY_ERROR: &str = "ConcurrencyError";

/// Success status of a response type.
pub trait ResponseStatus {
    /// Status when the service returned no response.
    const EMPTY: StatusCode;

    /// Status for a returned response. Reads only the mapper flags.
    fn status(&self) -> StatusCode;
}

const fn create_status(is_async: bool, existed: bool) -> StatusCode {
    if is_async {
        StatusCode::ACCEPTED
    } else if existed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    }
}

const fn async_or_ok(is_async: bool) -> StatusCode {
    if is_async {
        StatusCode::ACCEPTED
    } else {
        StatusCode::OK
    }
}

fn last_operation_status(state: OperationState, delete_operation: bool) -> StatusCode {
    if state == OperationState::Succeeded && delete_operation {
        StatusCode::GONE
    } else {
        StatusCode::OK
    }
}

impl ResponseStatus for CreateServiceInstanceResponse {
    const EMPTY: StatusCode = StatusCode::CREATED;

    fn status(&self) -> StatusCode {
        create_status(self.is_async, self.instance_existed)
    }
}

impl ResponseStatus for UpdateServiceInstanceResponse {
    const EMPTY: StatusCode = StatusCode::OK;

    fn status(&self) -> StatusCode {
        async_or_ok(self.is_async)
    }
}

impl ResponseStatus for DeleteServiceInstanceResponse {
    const EMPTY: StatusCode = StatusCode::OK;

    fn status(&self) -> StatusCode {
        async_or_ok(self.is_async)
    }
}

impl ResponseStatus for GetServiceInstanceResponse {
    const EMPTY: StatusCode = StatusCode::OK;

    fn status(&self) -> StatusCode {
        StatusCode::OK
    }
}

impl ResponseStatus for GetLastServiceOperationResponse {
    const EMPTY: StatusCode = StatusCode::OK;

    fn status(&self) -> StatusCode {
        last_operation_status(self.state, self.delete_operation)
    }
}

impl ResponseStatus for CreateServiceInstanceBindingResponse {
    const EMPTY: StatusCode = StatusCode::CREATED;

    fn status(&self) -> StatusCode {
        create_status(self.is_async, self.binding_existed)
    }
}

impl ResponseStatus for DeleteServiceInstanceBindingResponse {
    const EMPTY: StatusCode = StatusCode::OK;

    fn status(&self) -> StatusCode {
        async_or_ok(self.is_async)
    }
}

impl ResponseStatus for GetServiceInstanceBindingResponse {
    const EMPTY: StatusCode = StatusCode::OK;

    fn status(&self) -> StatusCode {
        StatusCode::OK
    }
}

impl ResponseStatus for GetLastServiceBindingOperationResponse {
    const EMPTY: StatusCode = StatusCode::OK;

    fn status(&self) -> StatusCode {
        last_operation_status(self.state, self.delete_operation)
    }
}

/// Status for a successful outcome.
#[must_use]
pub fn success_status<T: ResponseStatus>(response: Option<&T>) -> StatusCode {
    response.map_or(T::EMPTY, ResponseStatus::status)
}

/// Status for a failed outcome of `operation`.
#[must_use]
pub fn failure_status(operation: OperationKind, error: &ServiceBrokerError) -> StatusCode {
    match error.root() {
        ServiceBrokerError::ResourceDoesNotExist { resource, .. } => {
            does_not_exist_status(operation, *resource)
        }
        ServiceBrokerError::ResourceAlreadyExists { .. } => StatusCode::CONFLICT,
        ServiceBrokerError::OperationInProgress { .. } => StatusCode::NOT_FOUND,
        ServiceBrokerError::CatalogNotFound { .. }
        | ServiceBrokerError::UpdateNotSupported(_)
        | ServiceBrokerError::InvalidParameters(_)
        | ServiceBrokerError::AsyncRequired(_)
        | ServiceBrokerError::ConcurrencyError(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceBrokerError::Unclassified { status, .. } => status
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        // root() never returns a hook wrapper
        ServiceBrokerError::HookFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn does_not_exist_status(operation: OperationKind, resource: Resource) -> StatusCode {
    let target = match operation {
        OperationKind::CreateBinding
        | OperationKind::DeleteBinding
        | OperationKind::GetBinding
        | OperationKind::GetLastBindingOperation => Resource::ServiceBinding,
        _ => Resource::ServiceInstance,
    };
    if operation.is_get() {
        StatusCode::NOT_FOUND
    } else if operation.is_delete() && resource == target {
        StatusCode::GONE
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}

/// Error body for a failure.
#[must_use]
pub fn error_message(error: &ServiceBrokerError) -> ErrorMessage {
    let root = error.root();
    let message = ErrorMessage::new(root.to_string());
    match root {
        ServiceBrokerError::AsyncRequired(_) => message.with_error(ASYNC_REQUIRED_ERROR),
        ServiceBrokerError::ConcurrencyError(_) => message.with_error(CONCURRENCY_ERROR),
        ServiceBrokerError::OperationInProgress { operation } => {
            message.with_operation(operation.clone())
        }
        ServiceBrokerError::Unclassified {
            error_code: Some(code),
            ..
        } => message.with_error(code.clone()),
        _ => message,
    }
}

/// Map a complete outcome to the protocol response.
#[must_use]
pub fn map_outcome<T: ResponseStatus>(
    operation: OperationKind,
    outcome: Result<Option<T>, ServiceBrokerError>,
) -> BrokerResponse<T> {
    match outcome {
        Ok(Some(response)) => BrokerResponse::json(response.status(), response),
        Ok(None) => BrokerResponse::empty(T::EMPTY),
        Err(error) => {
            BrokerResponse::error(failure_status(operation, &error), error_message(&error))
        }
    }
}
