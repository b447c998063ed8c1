//! Event flows: ordered hooks around each broker operation.
//!
//! An [`EventFlowRegistry`] holds three ordered hook collections for one operation
//! kind:
//!
//! - **Initialization** hooks run before the business service. The first failure
//!   stops the phase and the service is never called.
//! - **Completion** hooks run after a successful business outcome. The first
//!   failure stops the phase and becomes the request's failure.
//! - **Error** hooks run when any earlier stage failed. They are notifications:
//!   their own failures are logged and dropped.
//!
//! Hooks run one after another, in registration order, against the same shared
//! request reference.
//!
//! # Example
//!
//! ```ignore
//! struct AuditFlow;
//!
//! #[async_trait]
//! impl InitializationFlow<CreateServiceInstanceRequest> for AuditFlow {
//!     async fn initialize(&self, request: &CreateServiceInstanceRequest) -> Result<(), ServiceBrokerError> {
//!         tracing::info!(instance = %request.service_instance_id, "provision requested");
//!         Ok(())
//!     }
//! }
//!
//! let registries = EventFlowRegistries::default().with_create_instance(
//!     EventFlowRegistry::new().with_initialization_flow(Arc::new(AuditFlow)),
//! );
//! ```

use crate::error::{FlowPhase, ServiceBrokerError};
use crate::model::{
    CreateServiceInstanceBindingRequest, CreateServiceInstanceBindingResponse,
    CreateServiceInstanceRequest, CreateServiceInstanceResponse,
    DeleteServiceInstanceBindingRequest, DeleteServiceInstanceBindingResponse,
    DeleteServiceInstanceRequest, DeleteServiceInstanceResponse,
    GetLastServiceBindingOperationRequest, GetLastServiceBindingOperationResponse,
    GetLastServiceOperationRequest, GetLastServiceOperationResponse, UpdateServiceInstanceRequest,
    UpdateServiceInstanceResponse,
};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Hook run before the business service is invoked.
#[async_trait]
pub trait InitializationFlow<Req>: Send + Sync
where
    Req: Sync,
{
    /// Inspect the request before it reaches the business service.
    ///
    /// # Errors
    ///
    /// Any error aborts the request; the business service is not called.
    async fn initialize(&self, request: &Req) -> Result<(), ServiceBrokerError>;
}

/// Hook run after the business service succeeded.
#[async_trait]
pub trait CompletionFlow<Req, Resp>: Send + Sync
where
    Req: Sync,
    Resp: Sync,
{
    /// Observe the request and its successful response.
    ///
    /// When the service returned no response, a default one is passed.
    ///
    /// # Errors
    ///
    /// Any error replaces the successful outcome with a failure.
    async fn complete(&self, request: &Req, response: &Resp) -> Result<(), ServiceBrokerError>;
}

/// Hook run after any stage of the request failed.
#[async_trait]
pub trait ErrorFlow<Req>: Send + Sync
where
    Req: Sync,
{
    /// Observe the failure.
    ///
    /// # Errors
    ///
    /// Errors are logged and discarded; they never change the response.
    async fn error(&self, request: &Req, error: &ServiceBrokerError) -> Result<(), ServiceBrokerError>;
}

/// Ordered hooks for one operation kind.
pub struct EventFlowRegistry<Req, Resp> {
    initialization_flows: Vec<Arc<dyn InitializationFlow<Req>>>,
    completion_flows: Vec<Arc<dyn CompletionFlow<Req, Resp>>>,
    error_flows: Vec<Arc<dyn ErrorFlow<Req>>>,
}

impl<Req, Resp> EventFlowRegistry<Req, Resp>
where
    Req: Sync,
    Resp: Sync,
{
    /// Create an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initialization_flows: Vec::new(),
            completion_flows: Vec::new(),
            error_flows: Vec::new(),
        }
    }

    /// Create a registry from three ordered hook lists.
    #[must_use]
    pub const fn from_flows(
        initialization_flows: Vec<Arc<dyn InitializationFlow<Req>>>,
        completion_flows: Vec<Arc<dyn CompletionFlow<Req, Resp>>>,
        error_flows: Vec<Arc<dyn ErrorFlow<Req>>>,
    ) -> Self {
        Self {
            initialization_flows,
            completion_flows,
            error_flows,
        }
    }

    /// Append an initialization hook.
    #[must_use]
    pub fn with_initialization_flow(mut self, flow: Arc<dyn InitializationFlow<Req>>) -> Self {
        self.initialization_flows.push(flow);
        self
    }

    /// Append a completion hook.
    #[must_use]
    pub fn with_completion_flow(mut self, flow: Arc<dyn CompletionFlow<Req, Resp>>) -> Self {
        self.completion_flows.push(flow);
        self
    }

    /// Append an error hook.
    #[must_use]
    pub fn with_error_flow(mut self, flow: Arc<dyn ErrorFlow<Req>>) -> Self {
        self.error_flows.push(flow);
        self
    }

    /// Number of initialization hooks.
    #[must_use]
    pub fn initialization_flow_count(&self) -> usize {
        self.initialization_flows.len()
    }

    /// Number of completion hooks.
    #[must_use]
    pub fn completion_flow_count(&self) -> usize {
        self.completion_flows.len()
    }

    /// Number of error hooks.
    #[must_use]
    pub fn error_flow_count(&self) -> usize {
        self.error_flows.len()
    }

    /// Run every initialization hook in order.
    ///
    /// # Errors
    ///
    /// Returns the first hook failure wrapped as
    /// [`ServiceBrokerError::HookFailure`]; later hooks are not run.
    pub async fn run_initialization(&self, request: &Req) -> Result<(), ServiceBrokerError> {
        for (index, flow) in self.initialization_flows.iter().enumerate() {
            flow.initialize(request).await.map_err(|error| {
                tracing::debug!(index, error = %error, "Initialization flow failed");
                ServiceBrokerError::hook(FlowPhase::Initialization, error)
            })?;
        }
        Ok(())
    }

    /// Run every completion hook in order.
    ///
    /// Does not run error hooks on failure; that is the caller's decision.
    ///
    /// # Errors
    ///
    /// Returns the first hook failure wrapped as
    /// [`ServiceBrokerError::HookFailure`]; later hooks are not run.
    pub async fn run_completion(&self, request: &Req, response: &Resp) -> Result<(), ServiceBrokerError> {
        for (index, flow) in self.completion_flows.iter().enumerate() {
            flow.complete(request, response).await.map_err(|error| {
                tracing::debug!(index, error = %error, "Completion flow failed");
                ServiceBrokerError::hook(FlowPhase::Completion, error)
            })?;
        }
        Ok(())
    }

    /// Run every error hook in order, swallowing their failures.
    ///
    /// Returns how many hooks failed.
    pub async fn run_error(&self, request: &Req, error: &ServiceBrokerError) -> usize {
        let mut failures = 0;
        for (index, flow) in self.error_flows.iter().enumerate() {
            if let Err(flow_error) = flow.error(request, error).await {
                failures += 1;
                tracing::warn!(
                    index,
                    error = %flow_error,
                    original_error = %error,
                    "Error flow failed; ignoring"
                );
            }
        }
        failures
    }
}

impl<Req, Resp> Default for EventFlowRegistry<Req, Resp>
where
    Req: Sync,
    Resp: Sync,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Req, Resp> fmt::Debug for EventFlowRegistry<Req, Resp> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFlowRegistry")
            .field("initialization_flows", &self.initialization_flows.len())
            .field("completion_flows", &self.completion_flows.len())
            .field("error_flows", &self.error_flows.len())
            .finish()
    }
}

/// Hooks for provisioning.
pub type CreateInstanceEventFlowRegistry =
    EventFlowRegistry<CreateServiceInstanceRequest, CreateServiceInstanceResponse>;
/// Hooks for updates.
pub type UpdateInstanceEventFlowRegistry =
    EventFlowRegistry<UpdateServiceInstanceRequest, UpdateServiceInstanceResponse>;
/// Hooks for deprovisioning.
pub type DeleteInstanceEventFlowRegistry =
    EventFlowRegistry<DeleteServiceInstanceRequest, DeleteServiceInstanceResponse>;
/// Hooks for instance `last_operation` polls.
pub type AsyncOperationEventFlowRegistry =
    EventFlowRegistry<GetLastServiceOperationRequest, GetLastServiceOperationResponse>;
/// Hooks for binding.
pub type CreateBindingEventFlowRegistry =
    EventFlowRegistry<CreateServiceInstanceBindingRequest, CreateServiceInstanceBindingResponse>;
/// Hooks for unbinding.
pub type DeleteBindingEventFlowRegistry =
    EventFlowRegistry<DeleteServiceInstanceBindingRequest, DeleteServiceInstanceBindingResponse>;
/// Hooks for binding `last_operation` polls.
pub type AsyncBindingOperationEventFlowRegistry = EventFlowRegistry<
    GetLastServiceBindingOperationRequest,
    GetLastServiceBindingOperationResponse,
>;

/// All registries, configured once at startup.
#[derive(Debug, Default)]
pub struct EventFlowRegistries {
    /// Provisioning hooks
    pub create_instance: CreateInstanceEventFlowRegistry,
    /// Update hooks
    pub update_instance: UpdateInstanceEventFlowRegistry,
    /// Deprovisioning hooks
    pub delete_instance: DeleteInstanceEventFlowRegistry,
    /// Instance poll hooks
    pub async_operation: AsyncOperationEventFlowRegistry,
    /// Binding hooks
    pub create_binding: CreateBindingEventFlowRegistry,
    /// Unbinding hooks
    pub delete_binding: DeleteBindingEventFlowRegistry,
    /// Binding poll hooks
    pub async_binding_operation: AsyncBindingOperationEventFlowRegistry,
}

impl EventFlowRegistries {
    /// Replace the provisioning registry.
    #[must_use]
    pub fn with_create_instance(mut self, registry: CreateInstanceEventFlowRegistry) -> Self {
        self.create_instance = registry;
        self
    }

    /// Replace the update registry.
    #[must_use]
    pub fn with_update_instance(mut self, registry: UpdateInstanceEventFlowRegistry) -> Self {
        self.update_instance = registry;
        self
    }

    /// Replace the deprovisioning registry.
    #[must_use]
    pub fn with_delete_instance(mut self, registry: DeleteInstanceEventFlowRegistry) -> Self {
        self.delete_instance = registry;
        self
    }

    /// Replace the instance poll registry.
    #[must_use]
    pub fn with_async_operation(mut self, registry: AsyncOperationEventFlowRegistry) -> Self {
        self.async_operation = registry;
        self
    }

    /// Replace the binding registry.
    #[must_use]
    pub fn with_create_binding(mut self, registry: CreateBindingEventFlowRegistry) -> Self {
        self.create_binding = registry;
        self
    }

    /// Replace the unbinding registry.
    #[must_use]
    pub fn with_delete_binding(mut self, registry: DeleteBindingEventFlowRegistry) -> Self {
        self.delete_binding = registry;
        self
    }

    /// Replace the binding poll registry.
    #[must_use]
    pub fn with_async_binding_operation(
        mut self,
        registry: AsyncBindingOperationEventFlowRegistry,
    ) -> Self {
        self.async_binding_operation = registry;
        self
    }
}
