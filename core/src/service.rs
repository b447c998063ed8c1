//! Business service traits implemented by broker authors.
//!
//! Every method returns `Ok(None)` when the service has nothing to report. The
//! orchestrator treats that as success: completion hooks receive a default
//! response and the wire body is empty.

use crate::error::ServiceBrokerError;
use crate::model::{
    CreateServiceInstanceBindingRequest, CreateServiceInstanceBindingResponse,
    CreateServiceInstanceRequest, CreateServiceInstanceResponse,
    DeleteServiceInstanceBindingRequest, DeleteServiceInstanceBindingResponse,
    DeleteServiceInstanceRequest, DeleteServiceInstanceResponse,
    GetLastServiceBindingOperationRequest, GetLastServiceBindingOperationResponse,
    GetLastServiceOperationRequest, GetLastServiceOperationResponse,
    GetServiceInstanceBindingRequest, GetServiceInstanceBindingResponse,
    GetServiceInstanceRequest, GetServiceInstanceResponse, UpdateServiceInstanceRequest,
    UpdateServiceInstanceResponse,
};
use async_trait::async_trait;

/// Status carried by the default "not supported" failures.
pub const NOT_SUPPORTED_STATUS: u16 = 400;

fn not_supported(operation: &str) -> ServiceBrokerError {
    ServiceBrokerError::with_status(
        NOT_SUPPORTED_STATUS,
        format!("{operation} operation not supported"),
    )
}

/// Provisions, updates and deprovisions service instances.
#[async_trait]
pub trait ServiceInstanceService: Send + Sync {
    /// Provision an instance.
    ///
    /// # Errors
    ///
    /// Any [`ServiceBrokerError`]; it is mapped to a status code and error hooks run.
    async fn create_service_instance(
        &self,
        request: &CreateServiceInstanceRequest,
    ) -> Result<Option<CreateServiceInstanceResponse>, ServiceBrokerError>;

    /// Update an instance.
    ///
    /// # Errors
    ///
    /// Any [`ServiceBrokerError`]; it is mapped to a status code and error hooks run.
    async fn update_service_instance(
        &self,
        request: &UpdateServiceInstanceRequest,
    ) -> Result<Option<UpdateServiceInstanceResponse>, ServiceBrokerError>;

    /// Deprovision an instance.
    ///
    /// # Errors
    ///
    /// Any [`ServiceBrokerError`]; it is mapped to a status code and error hooks run.
    async fn delete_service_instance(
        &self,
        request: &DeleteServiceInstanceRequest,
    ) -> Result<Option<DeleteServiceInstanceResponse>, ServiceBrokerError>;

    /// Fetch an instance.
    ///
    /// # Errors
    ///
    /// Not supported unless overridden.
    async fn get_service_instance(
        &self,
        _request: &GetServiceInstanceRequest,
    ) -> Result<Option<GetServiceInstanceResponse>, ServiceBrokerError> {
        Err(not_supported("get service instance"))
    }

    /// Report the state of the last asynchronous operation.
    ///
    /// # Errors
    ///
    /// Not supported unless overridden.
    async fn get_last_operation(
        &self,
        _request: &GetLastServiceOperationRequest,
    ) -> Result<Option<GetLastServiceOperationResponse>, ServiceBrokerError> {
        Err(not_supported("last operation"))
    }
}

/// Creates and deletes service bindings.
#[async_trait]
pub trait ServiceInstanceBindingService: Send + Sync {
    /// Create a binding.
    ///
    /// # Errors
    ///
    /// Any [`ServiceBrokerError`]; it is mapped to a status code and error hooks run.
    async fn create_service_instance_binding(
        &self,
        request: &CreateServiceInstanceBindingRequest,
    ) -> Result<Option<CreateServiceInstanceBindingResponse>, ServiceBrokerError>;

    /// Delete a binding.
    ///
    /// # Errors
    ///
    /// Any [`ServiceBrokerError`]; it is mapped to a status code and error hooks run.
    async fn delete_service_instance_binding(
        &self,
        request: &DeleteServiceInstanceBindingRequest,
    ) -> Result<Option<DeleteServiceInstanceBindingResponse>, ServiceBrokerError>;

    /// Fetch a binding.
    ///
    /// # Errors
    ///
    /// Not supported unless overridden.
    async fn get_service_instance_binding(
        &self,
        _request: &GetServiceInstanceBindingRequest,
    ) -> Result<Option<GetServiceInstanceBindingResponse>, ServiceBrokerError> {
        Err(not_supported("get service instance binding"))
    }

    /// Report the state of the last asynchronous binding operation.
    ///
    /// # Errors
    ///
    /// Not supported unless overridden.
    async fn get_last_operation(
        &self,
        _request: &GetLastServiceBindingOperationRequest,
    ) -> Result<Option<GetLastServiceBindingOperationResponse>, ServiceBrokerError> {
        Err(not_supported("last binding operation"))
    }
}
