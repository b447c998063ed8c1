//! Stub business services with scripted outcomes and call counters.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)]

use async_trait::async_trait;
use service_broker_core::{
    CreateServiceInstanceBindingRequest, CreateServiceInstanceBindingResponse,
    CreateServiceInstanceRequest, CreateServiceInstanceResponse,
    DeleteServiceInstanceBindingRequest, DeleteServiceInstanceBindingResponse,
    DeleteServiceInstanceRequest, DeleteServiceInstanceResponse,
    GetLastServiceBindingOperationRequest, GetLastServiceBindingOperationResponse,
    GetLastServiceOperationRequest, GetLastServiceOperationResponse,
    GetServiceInstanceBindingRequest, GetServiceInstanceBindingResponse,
    GetServiceInstanceRequest, GetServiceInstanceResponse, OperationKind, OperationState,
    ServiceBrokerError, ServiceInstanceBindingService, ServiceInstanceService,
    UpdateServiceInstanceRequest, UpdateServiceInstanceResponse,
};
use std::collections::HashMap;
use std::sync::Mutex;

/// What a stubbed service method returns.
pub type Outcome<T> = Result<Option<T>, ServiceBrokerError>;

/// Per-operation call counter.
#[derive(Debug, Default)]
pub struct CallCounter {
    counts: Mutex<HashMap<OperationKind, usize>>,
}

impl CallCounter {
    fn record(&self, operation: OperationKind) {
        *self.counts.lock().unwrap().entry(operation).or_default() += 1;
    }

    /// How many times `operation` was invoked.
    #[must_use]
    pub fn get(&self, operation: OperationKind) -> usize {
        self.counts.lock().unwrap().get(&operation).copied().unwrap_or(0)
    }

    /// Total invocations across all operations.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.lock().unwrap().values().sum()
    }
}

/// [`ServiceInstanceService`] that returns scripted outcomes.
///
/// Defaults: every operation succeeds with a default response; `last_operation`
/// reports `succeeded`.
#[derive(Debug)]
pub struct StubInstanceService {
    create: Outcome<CreateServiceInstanceResponse>,
    update: Outcome<UpdateServiceInstanceResponse>,
    delete: Outcome<DeleteServiceInstanceResponse>,
    get: Outcome<GetServiceInstanceResponse>,
    last_operation: Outcome<GetLastServiceOperationResponse>,
    calls: CallCounter,
    created: Mutex<Vec<CreateServiceInstanceRequest>>,
    updated: Mutex<Vec<UpdateServiceInstanceRequest>>,
    deleted: Mutex<Vec<DeleteServiceInstanceRequest>>,
    polled: Mutex<Vec<GetLastServiceOperationRequest>>,
}

impl Default for StubInstanceService {
    fn default() -> Self {
        Self {
            create: Ok(Some(CreateServiceInstanceResponse::default())),
            update: Ok(Some(UpdateServiceInstanceResponse::default())),
            delete: Ok(Some(DeleteServiceInstanceResponse::default())),
            get: Ok(Some(GetServiceInstanceResponse::default())),
            last_operation: Ok(Some(GetLastServiceOperationResponse::with_state(
                OperationState::Succeeded,
            ))),
            calls: CallCounter::default(),
            created: Mutex::default(),
            updated: Mutex::default(),
            deleted: Mutex::default(),
            polled: Mutex::default(),
        }
    }
}

impl StubInstanceService {
    /// Stub with default outcomes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the provisioning outcome.
    #[must_use]
    pub fn on_create(mut self, outcome: Outcome<CreateServiceInstanceResponse>) -> Self {
        self.create = outcome;
        self
    }

    /// Script the update outcome.
    #[must_use]
    pub fn on_update(mut self, outcome: Outcome<UpdateServiceInstanceResponse>) -> Self {
        self.update = outcome;
        self
    }

    /// Script the deprovisioning outcome.
    #[must_use]
    pub fn on_delete(mut self, outcome: Outcome<DeleteServiceInstanceResponse>) -> Self {
        self.delete = outcome;
        self
    }

    /// Script the fetch outcome.
    #[must_use]
    pub fn on_get(mut self, outcome: Outcome<GetServiceInstanceResponse>) -> Self {
        self.get = outcome;
        self
    }

    /// Script the `last_operation` outcome.
    #[must_use]
    pub fn on_last_operation(mut self, outcome: Outcome<GetLastServiceOperationResponse>) -> Self {
        self.last_operation = outcome;
        self
    }

    /// Invocation counts.
    #[must_use]
    pub const fn calls(&self) -> &CallCounter {
        &self.calls
    }

    /// Provisioning requests received, in order.
    #[must_use]
    pub fn created(&self) -> Vec<CreateServiceInstanceRequest> {
        self.created.lock().unwrap().clone()
    }

    /// Update requests received, in order.
    #[must_use]
    pub fn updated(&self) -> Vec<UpdateServiceInstanceRequest> {
        self.updated.lock().unwrap().clone()
    }

    /// Deprovisioning requests received, in order.
    #[must_use]
    pub fn deleted(&self) -> Vec<DeleteServiceInstanceRequest> {
        self.deleted.lock().unwrap().clone()
    }

    /// `last_operation` polls received, in order.
    #[must_use]
    pub fn polled(&self) -> Vec<GetLastServiceOperationRequest> {
        self.polled.lock().unwrap().clone()
    }
}

#[async_trait]
impl ServiceInstanceService for StubInstanceService {
    async fn create_service_instance(
        &self,
        request: &CreateServiceInstanceRequest,
    ) -> Result<Option<CreateServiceInstanceResponse>, ServiceBrokerError> {
        self.calls.record(OperationKind::CreateInstance);
        self.created.lock().unwrap().push(request.clone());
        self.create.clone()
    }

    async fn update_service_instance(
        &self,
        request: &UpdateServiceInstanceRequest,
    ) -> Result<Option<UpdateServiceInstanceResponse>, ServiceBrokerError> {
        self.calls.record(OperationKind::UpdateInstance);
        self.updated.lock().unwrap().push(request.clone());
        self.update.clone()
    }

    async fn delete_service_instance(
        &self,
        request: &DeleteServiceInstanceRequest,
    ) -> Result<Option<DeleteServiceInstanceResponse>, ServiceBrokerError> {
        self.calls.record(OperationKind::DeleteInstance);
        self.deleted.lock().unwrap().push(request.clone());
        self.delete.clone()
    }

    async fn get_service_instance(
        &self,
        _request: &GetServiceInstanceRequest,
    ) -> Result<Option<GetServiceInstanceResponse>, ServiceBrokerError> {
        self.calls.record(OperationKind::GetInstance);
        self.get.clone()
    }

    async fn get_last_operation(
        &self,
        request: &GetLastServiceOperationRequest,
    ) -> Result<Option<GetLastServiceOperationResponse>, ServiceBrokerError> {
        self.calls.record(OperationKind::GetLastOperation);
        self.polled.lock().unwrap().push(request.clone());
        self.last_operation.clone()
    }
}

/// [`ServiceInstanceBindingService`] that returns scripted outcomes.
#[derive(Debug)]
pub struct StubBindingService {
    create: Outcome<CreateServiceInstanceBindingResponse>,
    delete: Outcome<DeleteServiceInstanceBindingResponse>,
    get: Outcome<GetServiceInstanceBindingResponse>,
    last_operation: Outcome<GetLastServiceBindingOperationResponse>,
    calls: CallCounter,
    created: Mutex<Vec<CreateServiceInstanceBindingRequest>>,
    deleted: Mutex<Vec<DeleteServiceInstanceBindingRequest>>,
}

impl Default for StubBindingService {
    fn default() -> Self {
        Self {
            create: Ok(Some(CreateServiceInstanceBindingResponse::default())),
            delete: Ok(Some(DeleteServiceInstanceBindingResponse::default())),
            get: Ok(Some(GetServiceInstanceBindingResponse::default())),
            last_operation: Ok(Some(GetLastServiceBindingOperationResponse::with_state(
                OperationState::Succeeded,
            ))),
            calls: CallCounter::default(),
            created: Mutex::default(),
            deleted: Mutex::default(),
        }
    }
}

impl StubBindingService {
    /// Stub with default outcomes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the binding outcome.
    #[must_use]
    pub fn on_create(mut self, outcome: Outcome<CreateServiceInstanceBindingResponse>) -> Self {
        self.create = outcome;
        self
    }

    /// Script the unbinding outcome.
    #[must_use]
    pub fn on_delete(mut self, outcome: Outcome<DeleteServiceInstanceBindingResponse>) -> Self {
        self.delete = outcome;
        self
    }

    /// Script the fetch outcome.
    #[must_use]
    pub fn on_get(mut self, outcome: Outcome<GetServiceInstanceBindingResponse>) -> Self {
        self.get = outcome;
        self
    }

    /// Script the `last_operation` outcome.
    #[must_use]
    pub fn on_last_operation(
        mut self,
        outcome: Outcome<GetLastServiceBindingOperationResponse>,
    ) -> Self {
        self.last_operation = outcome;
        self
    }

    /// Invocation counts.
    #[must_use]
    pub const fn calls(&self) -> &CallCounter {
        &self.calls
    }

    /// Binding requests received, in order.
    #[must_use]
    pub fn created(&self) -> Vec<CreateServiceInstanceBindingRequest> {
        self.created.lock().unwrap().clone()
    }

    /// Unbinding requests received, in order.
    #[must_use]
    pub fn deleted(&self) -> Vec<DeleteServiceInstanceBindingRequest> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ServiceInstanceBindingService for StubBindingService {
    async fn create_service_instance_binding(
        &self,
        request: &CreateServiceInstanceBindingRequest,
    ) -> Result<Option<CreateServiceInstanceBindingResponse>, ServiceBrokerError> {
        self.calls.record(OperationKind::CreateBinding);
        self.created.lock().unwrap().push(request.clone());
        self.create.clone()
    }

    async fn delete_service_instance_binding(
        &self,
        request: &DeleteServiceInstanceBindingRequest,
    ) -> Result<Option<DeleteServiceInstanceBindingResponse>, ServiceBrokerError> {
        self.calls.record(OperationKind::DeleteBinding);
        self.deleted.lock().unwrap().push(request.clone());
        self.delete.clone()
    }

    async fn get_service_instance_binding(
        &self,
        _request: &GetServiceInstanceBindingRequest,
    ) -> Result<Option<GetServiceInstanceBindingResponse>, ServiceBrokerError> {
        self.calls.record(OperationKind::GetBinding);
        self.get.clone()
    }

    async fn get_last_operation(
        &self,
        _request: &GetLastServiceBindingOperationRequest,
    ) -> Result<Option<GetLastServiceBindingOperationResponse>, ServiceBrokerError> {
        self.calls.record(OperationKind::GetLastBindingOperation);
        self.last_operation.clone()
    }
}
