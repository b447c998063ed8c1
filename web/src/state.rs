//! Application state for Axum handlers.

use service_broker_runtime::ServiceBroker;
use std::sync::Arc;

/// State shared across all broker handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    broker: Arc<ServiceBroker>,
}

impl AppState {
    /// Wrap a configured broker.
    #[must_use]
    pub fn new(broker: ServiceBroker) -> Self {
        Self {
            broker: Arc::new(broker),
        }
    }

    /// The broker.
    #[must_use]
    pub fn broker(&self) -> &ServiceBroker {
        &self.broker
    }
}
