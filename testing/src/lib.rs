//! # Service Broker Testing
//!
//! Testing utilities for broker orchestration.
//!
//! This crate provides:
//! - [`RecordingFlow`] and [`FlowLog`]: hooks that record every run in order
//! - [`StubInstanceService`] and [`StubBindingService`]: scripted outcomes with call counters
//! - [`fixtures`]: a small catalog and inbound-request builders
//! - [`properties`]: proptest strategies for response flags
//!
//! ## Example
//!
//! ```ignore
//! use service_broker_testing::{fixtures, FlowLog, RecordingFlow, StubInstanceService};
//!
//! #[tokio::test]
//! async fn test_provision() {
//!     let log = FlowLog::new();
//!     let service = Arc::new(StubInstanceService::new());
//!     let broker = ServiceBroker::builder(fixtures::in_memory_catalog(), service.clone())
//!         .event_flows(EventFlowRegistries::default().with_create_instance(
//!             EventFlowRegistry::new().with_initialization_flow(RecordingFlow::new("audit", &log)),
//!         ))
//!         .build();
//!
//!     let response = broker
//!         .instances()
//!         .create_service_instance(fixtures::create_instance("sd-1", "plan-1"))
//!         .await;
//!
//!     assert_eq!(response.status, StatusCode::CREATED);
//!     assert_eq!(log.names(), vec!["audit"]);
//! }
//! ```

pub mod fixtures;
pub mod flows;
pub mod services;

/// Test helpers and utilities.
pub mod helpers {
    /// Install a test-friendly tracing subscriber once per process.
    ///
    /// Honors `RUST_LOG`; output goes through the test harness writer.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;
    use service_broker_core::OperationState;

    /// Any operation state.
    pub fn operation_state() -> impl Strategy<Value = OperationState> {
        prop_oneof![
            Just(OperationState::InProgress),
            Just(OperationState::Succeeded),
            Just(OperationState::Failed),
        ]
    }

    /// Optional operation identifier.
    pub fn operation_id() -> impl Strategy<Value = Option<String>> {
        proptest::option::of("[a-z0-9-]{1,16}")
    }
}

// Re-export commonly used items
pub use flows::{FlowCall, FlowLog, RecordingFlow};
pub use services::{CallCounter, Outcome, StubBindingService, StubInstanceService};

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use service_broker_core::{CatalogService, OperationKind, ServiceInstanceService};

    #[test]
    fn test_fixture_catalog_resolves() {
        let catalog = fixtures::in_memory_catalog();
        let definition = tokio_test::block_on(catalog.get_service_definition(fixtures::SERVICE_ID)).unwrap();

        assert!(definition.bindable);
        assert!(catalog.lookup_plan(&definition, fixtures::OTHER_PLAN_ID).is_some());
    }

    #[test]
    fn test_stub_counts_calls() {
        let service = StubInstanceService::new();
        let request = service_broker_core::GetServiceInstanceRequest {
            service_instance_id: fixtures::INSTANCE_ID.to_string(),
            envelope: service_broker_core::RequestEnvelope::default(),
        };

        tokio_test::block_on(service.get_service_instance(&request)).unwrap();

        assert_eq!(service.calls().get(OperationKind::GetInstance), 1);
        assert_eq!(service.calls().get(OperationKind::CreateInstance), 0);
        assert_eq!(service.calls().total(), 1);
    }
}
