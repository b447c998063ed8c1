//! Recording event flows.
//!
//! Every [`RecordingFlow`] writes into a shared [`FlowLog`], so a test can assert
//! on the exact order hooks ran in across all three phases.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)]

use async_trait::async_trait;
use service_broker_core::{CompletionFlow, ErrorFlow, InitializationFlow, ServiceBrokerError};
use std::sync::{Arc, Mutex};

/// One hook invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowCall {
    /// An initialization hook ran
    Initialization(String),
    /// A completion hook ran
    Completion(String),
    /// An error hook ran with the given failure
    Error {
        /// Hook name
        name: String,
        /// The failure it observed
        error: ServiceBrokerError,
    },
}

impl FlowCall {
    /// Name of the hook.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Initialization(name) | Self::Completion(name) | Self::Error { name, .. } => name,
        }
    }
}

/// Ordered log shared by recording flows.
#[derive(Debug, Clone, Default)]
pub struct FlowLog {
    calls: Arc<Mutex<Vec<FlowCall>>>,
}

impl FlowLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, call: FlowCall) {
        self.calls.lock().unwrap().push(call);
    }

    /// Every call, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<FlowCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Hook names, in call order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.calls().iter().map(|call| call.name().to_string()).collect()
    }

    /// Number of initialization hook runs.
    #[must_use]
    pub fn initialization_count(&self) -> usize {
        self.count(|call| matches!(call, FlowCall::Initialization(_)))
    }

    /// Number of completion hook runs.
    #[must_use]
    pub fn completion_count(&self) -> usize {
        self.count(|call| matches!(call, FlowCall::Completion(_)))
    }

    /// Number of error hook runs.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.count(|call| matches!(call, FlowCall::Error { .. }))
    }

    /// Failures observed by error hooks, in order.
    #[must_use]
    pub fn errors(&self) -> Vec<ServiceBrokerError> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                FlowCall::Error { error, .. } => Some(error),
                FlowCall::Initialization(_) | FlowCall::Completion(_) => None,
            })
            .collect()
    }

    /// Forget every recorded call.
    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn count(&self, predicate: impl Fn(&FlowCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|call| predicate(call)).count()
    }
}

/// A hook usable in any phase of any registry. Records each run and optionally fails.
///
/// # Example
///
/// ```
/// use service_broker_core::ServiceBrokerError;
/// use service_broker_core::event_flow::CreateInstanceEventFlowRegistry;
/// use service_broker_testing::{FlowLog, RecordingFlow};
///
/// let log = FlowLog::new();
/// let registry = CreateInstanceEventFlowRegistry::new()
///     .with_initialization_flow(RecordingFlow::new("audit", &log))
///     .with_error_flow(RecordingFlow::failing(
///         "alert",
///         &log,
///         ServiceBrokerError::unclassified("pager offline"),
///     ));
///
/// assert_eq!(registry.initialization_flow_count(), 1);
/// assert!(log.calls().is_empty());
/// ```
#[derive(Debug)]
pub struct RecordingFlow {
    name: String,
    log: FlowLog,
    failure: Option<ServiceBrokerError>,
}

impl RecordingFlow {
    /// A hook that records and succeeds.
    #[must_use]
    pub fn new(name: impl Into<String>, log: &FlowLog) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            log: log.clone(),
            failure: None,
        })
    }

    /// A hook that records and then fails with `failure`.
    #[must_use]
    pub fn failing(name: impl Into<String>, log: &FlowLog, failure: ServiceBrokerError) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            log: log.clone(),
            failure: Some(failure),
        })
    }

    fn outcome(&self) -> Result<(), ServiceBrokerError> {
        self.failure.clone().map_or(Ok(()), Err)
    }
}

#[async_trait]
impl<Req> InitializationFlow<Req> for RecordingFlow
where
    Req: Sync,
{
    async fn initialize(&self, _request: &Req) -> Result<(), ServiceBrokerError> {
        self.log.push(FlowCall::Initialization(self.name.clone()));
        self.outcome()
    }
}

#[async_trait]
impl<Req, Resp> CompletionFlow<Req, Resp> for RecordingFlow
where
    Req: Sync,
    Resp: Sync,
{
    async fn complete(&self, _request: &Req, _response: &Resp) -> Result<(), ServiceBrokerError> {
        self.log.push(FlowCall::Completion(self.name.clone()));
        self.outcome()
    }
}

#[async_trait]
impl<Req> ErrorFlow<Req> for RecordingFlow
where
    Req: Sync,
{
    async fn error(&self, _request: &Req, error: &ServiceBrokerError) -> Result<(), ServiceBrokerError> {
        self.log.push(FlowCall::Error {
            name: self.name.clone(),
            error: error.clone(),
        });
        self.outcome()
    }
}
