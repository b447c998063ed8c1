//! Integration tests for service instance orchestration
//!
//! Drives `InstanceOrchestrator` end to end with stub services and recording
//! flows: catalog resolution, hook ordering, failure routing and status mapping.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use http::StatusCode;
use service_broker_core::event_flow::{
    AsyncOperationEventFlowRegistry, CreateInstanceEventFlowRegistry,
    DeleteInstanceEventFlowRegistry, UpdateInstanceEventFlowRegistry,
};
use service_broker_core::{
    CatalogService, CreateServiceInstanceResponse, DeleteServiceInstanceResponse,
    EventFlowRegistries, FlowPhase, GetLastServiceOperationResponse, GetServiceInstanceResponse,
    LastOperationQuery, OperationKind, OperationState, RequestEnvelope, ServiceBrokerError,
    UpdateServiceInstanceResponse,
};
use service_broker_runtime::{ErrorMessage, ResponseBody, ServiceBroker};
use service_broker_testing::fixtures::{self, OTHER_PLAN_ID, PLAN_ID, SERVICE_ID};
use service_broker_testing::{FlowLog, RecordingFlow, StubInstanceService};
use std::sync::Arc;

// ============================================================================
// Test Fixtures
// ============================================================================

fn build_broker(service: &Arc<StubInstanceService>, flows: EventFlowRegistries) -> ServiceBroker {
    service_broker_testing::helpers::init_test_tracing();
    ServiceBroker::builder(fixtures::in_memory_catalog(), Arc::clone(service) as _)
        .event_flows(flows)
        .build()
}

fn create_flows(log: &FlowLog) -> EventFlowRegistries {
    EventFlowRegistries::default().with_create_instance(
        CreateInstanceEventFlowRegistry::new()
            .with_initialization_flow(RecordingFlow::new("init-1", log))
            .with_initialization_flow(RecordingFlow::new("init-2", log))
            .with_completion_flow(RecordingFlow::new("complete-1", log))
            .with_completion_flow(RecordingFlow::new("complete-2", log))
            .with_completion_flow(RecordingFlow::new("complete-3", log))
            .with_error_flow(RecordingFlow::new("error-1", log)),
    )
}

// ============================================================================
// Provision
// ============================================================================

#[tokio::test]
async fn test_success_runs_each_init_and_completion_hook_once_in_order() {
    let log = FlowLog::new();
    let service = Arc::new(StubInstanceService::new());
    let broker = build_broker(&service, create_flows(&log));

    let response = broker
        .instances()
        .create_service_instance(fixtures::create_instance(SERVICE_ID, PLAN_ID))
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(
        log.names(),
        vec!["init-1", "init-2", "complete-1", "complete-2", "complete-3"]
    );
    assert_eq!(log.initialization_count(), 2);
    assert_eq!(log.completion_count(), 3);
    assert_eq!(log.error_count(), 0);
    assert_eq!(service.calls().get(OperationKind::CreateInstance), 1);
}

#[tokio::test]
async fn test_existing_instance_returns_ok_with_unchanged_body() {
    let returned = CreateServiceInstanceResponse {
        instance_existed: true,
        dashboard_url: Some("https://dashboard.example.com/instance-1".to_string()),
        operation: Some("provision-1".to_string()),
        ..CreateServiceInstanceResponse::default()
    };
    let service = Arc::new(StubInstanceService::new().on_create(Ok(Some(returned.clone()))));
    let broker = build_broker(&service, EventFlowRegistries::default());

    let response = broker
        .instances()
        .create_service_instance(fixtures::create_instance("sd-1", "plan-1"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, ResponseBody::Json(returned));
}

#[tokio::test]
async fn test_empty_create_returns_created_with_empty_body() {
    let service = Arc::new(StubInstanceService::new().on_create(Ok(None)));
    let broker = build_broker(&service, EventFlowRegistries::default());

    let response = broker
        .instances()
        .create_service_instance(fixtures::create_instance(SERVICE_ID, PLAN_ID))
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body, ResponseBody::Empty);
}

#[tokio::test]
async fn test_async_create_takes_priority_over_existed() {
    let service = Arc::new(StubInstanceService::new().on_create(Ok(Some(
        CreateServiceInstanceResponse {
            is_async: true,
            instance_existed: true,
            ..CreateServiceInstanceResponse::default()
        },
    ))));
    let broker = build_broker(&service, EventFlowRegistries::default());

    let response = broker
        .instances()
        .create_service_instance(fixtures::create_instance(SERVICE_ID, PLAN_ID).accepts_incomplete(true))
        .await;

    assert_eq!(response.status, StatusCode::ACCEPTED);
    assert!(service.created()[0].async_accepted);
}

#[tokio::test]
async fn test_unknown_service_definition_is_unprocessable_and_skips_everything() {
    let log = FlowLog::new();
    let service = Arc::new(StubInstanceService::new());
    let broker = build_broker(&service, create_flows(&log));

    let response = broker
        .instances()
        .create_service_instance(fixtures::create_instance("sd-unknown", PLAN_ID))
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.error_message().map(|message| message.description.as_str()),
        Some("Service definition does not exist: id=sd-unknown")
    );
    assert_eq!(service.calls().total(), 0);
    assert!(log.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_plan_is_unprocessable() {
    let service = Arc::new(StubInstanceService::new());
    let broker = build_broker(&service, EventFlowRegistries::default());

    let response = broker
        .instances()
        .create_service_instance(fixtures::create_instance(SERVICE_ID, "plan-unknown"))
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(service.calls().total(), 0);
}

#[tokio::test]
async fn test_initialization_failure_never_invokes_service() {
    let log = FlowLog::new();
    let failure = ServiceBrokerError::InvalidParameters("size must be positive".to_string());
    let flows = EventFlowRegistries::default().with_create_instance(
        CreateInstanceEventFlowRegistry::new()
            .with_initialization_flow(RecordingFlow::new("init-1", &log))
            .with_initialization_flow(RecordingFlow::failing("init-2", &log, failure.clone()))
            .with_initialization_flow(RecordingFlow::new("init-3", &log))
            .with_completion_flow(RecordingFlow::new("complete-1", &log))
            .with_error_flow(RecordingFlow::new("error-1", &log))
            .with_error_flow(RecordingFlow::new("error-2", &log)),
    );
    let service = Arc::new(StubInstanceService::new());
    let broker = build_broker(&service, flows);

    let response = broker
        .instances()
        .create_service_instance(fixtures::create_instance(SERVICE_ID, PLAN_ID))
        .await;

    assert_eq!(service.calls().get(OperationKind::CreateInstance), 0);
    assert_eq!(log.names(), vec!["init-1", "init-2", "error-1", "error-2"]);

    let wrapped = ServiceBrokerError::hook(FlowPhase::Initialization, failure);
    assert_eq!(log.errors(), vec![wrapped.clone(), wrapped]);

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.body,
        ResponseBody::Error(ErrorMessage::new("size must be positive"))
    );
}

#[tokio::test]
async fn test_completion_failure_replaces_success_and_runs_error_flows_once() {
    let log = FlowLog::new();
    let flows = EventFlowRegistries::default().with_create_instance(
        CreateInstanceEventFlowRegistry::new()
            .with_completion_flow(RecordingFlow::failing(
                "complete-1",
                &log,
                ServiceBrokerError::unclassified("audit store offline"),
            ))
            .with_completion_flow(RecordingFlow::new("complete-2", &log))
            .with_error_flow(RecordingFlow::new("error-1", &log)),
    );
    let service = Arc::new(StubInstanceService::new());
    let broker = build_broker(&service, flows);

    let response = broker
        .instances()
        .create_service_instance(fixtures::create_instance(SERVICE_ID, PLAN_ID))
        .await;

    assert_eq!(service.calls().get(OperationKind::CreateInstance), 1);
    assert_eq!(log.names(), vec!["complete-1", "error-1"]);
    assert!(matches!(
        log.errors()[0],
        ServiceBrokerError::HookFailure { phase: FlowPhase::Completion, .. }
    ));
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_failing_error_flow_does_not_mask_original_failure() {
    let log = FlowLog::new();
    let flows = EventFlowRegistries::default().with_create_instance(
        CreateInstanceEventFlowRegistry::new()
            .with_error_flow(RecordingFlow::failing(
                "error-1",
                &log,
                ServiceBrokerError::unclassified("notifier down"),
            ))
            .with_error_flow(RecordingFlow::new("error-2", &log)),
    );
    let service = Arc::new(
        StubInstanceService::new().on_create(Err(ServiceBrokerError::instance_exists("instance-1"))),
    );
    let broker = build_broker(&service, flows);

    let response = broker
        .instances()
        .create_service_instance(fixtures::create_instance(SERVICE_ID, PLAN_ID))
        .await;

    assert_eq!(log.names(), vec!["error-1", "error-2"]);
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(
        response.error_message().map(|message| message.description.clone()),
        Some("Service instance already exists: id=instance-1".to_string())
    );
}

#[tokio::test]
async fn test_enriched_request_carries_catalog_entries_by_identity() {
    let catalog = fixtures::in_memory_catalog();
    let service = Arc::new(StubInstanceService::new());
    let broker = ServiceBroker::builder(catalog.clone(), Arc::clone(&service) as _).build();

    let envelope = RequestEnvelope {
        platform_instance_id: Some("platform-a".to_string()),
        request_identity: Some("request-7".to_string()),
        ..RequestEnvelope::default()
    };
    broker
        .instances()
        .create_service_instance(
            fixtures::create_instance(SERVICE_ID, PLAN_ID).with_envelope(envelope.clone()),
        )
        .await;

    let definition = catalog.get_service_definition(SERVICE_ID).await.unwrap();
    let plan = catalog.lookup_plan(&definition, PLAN_ID).unwrap();
    let request = &service.created()[0];

    assert!(Arc::ptr_eq(&request.service_definition, &definition));
    assert!(Arc::ptr_eq(&request.plan, &plan));
    assert_eq!(request.service_definition_id, SERVICE_ID);
    assert_eq!(request.plan_id, PLAN_ID);
    assert_eq!(request.envelope, envelope);
}

// ============================================================================
// Update
// ============================================================================

#[tokio::test]
async fn test_update_statuses() {
    let service = Arc::new(StubInstanceService::new().on_update(Ok(None)));
    let broker = build_broker(&service, EventFlowRegistries::default());
    let response = broker
        .instances()
        .update_service_instance(fixtures::update_instance(SERVICE_ID, None))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(service.updated()[0].plan.is_none());

    let service = Arc::new(StubInstanceService::new().on_update(Ok(Some(
        UpdateServiceInstanceResponse {
            is_async: true,
            ..UpdateServiceInstanceResponse::default()
        },
    ))));
    let broker = build_broker(&service, EventFlowRegistries::default());
    let response = broker
        .instances()
        .update_service_instance(fixtures::update_instance(SERVICE_ID, Some(OTHER_PLAN_ID)))
        .await;
    assert_eq!(response.status, StatusCode::ACCEPTED);
    assert_eq!(service.updated()[0].plan.as_ref().map(|plan| plan.id.as_str()), Some(OTHER_PLAN_ID));
}

#[tokio::test]
async fn test_update_with_unknown_plan_is_unprocessable_without_flows() {
    let log = FlowLog::new();
    let flows = EventFlowRegistries::default().with_update_instance(
        UpdateInstanceEventFlowRegistry::new()
            .with_initialization_flow(RecordingFlow::new("init", &log))
            .with_error_flow(RecordingFlow::new("error", &log)),
    );
    let service = Arc::new(StubInstanceService::new());
    let broker = build_broker(&service, flows);

    let response = broker
        .instances()
        .update_service_instance(fixtures::update_instance(SERVICE_ID, Some("plan-unknown")))
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(log.calls().is_empty());
    assert_eq!(service.calls().total(), 0);
}

#[tokio::test]
async fn test_update_not_supported_is_unprocessable() {
    let service = Arc::new(StubInstanceService::new().on_update(Err(
        ServiceBrokerError::UpdateNotSupported("plan downgrade".to_string()),
    )));
    let broker = build_broker(&service, EventFlowRegistries::default());

    let response = broker
        .instances()
        .update_service_instance(fixtures::update_instance(SERVICE_ID, Some(PLAN_ID)))
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ============================================================================
// Deprovision
// ============================================================================

#[tokio::test]
async fn test_delete_of_missing_instance_is_gone_and_skips_completion() {
    let log = FlowLog::new();
    let flows = EventFlowRegistries::default().with_delete_instance(
        DeleteInstanceEventFlowRegistry::new()
            .with_initialization_flow(RecordingFlow::new("init", &log))
            .with_completion_flow(RecordingFlow::new("complete", &log))
            .with_error_flow(RecordingFlow::new("error", &log)),
    );
    let service = Arc::new(
        StubInstanceService::new().on_delete(Err(ServiceBrokerError::instance_does_not_exist("instance-1"))),
    );
    let broker = build_broker(&service, flows);

    let response = broker
        .instances()
        .delete_service_instance(fixtures::delete_instance(SERVICE_ID, PLAN_ID))
        .await;

    assert_eq!(response.status, StatusCode::GONE);
    assert_eq!(log.names(), vec!["init", "error"]);
    assert_eq!(log.completion_count(), 0);
}

#[tokio::test]
async fn test_delete_tolerates_orphaned_service_definition() {
    let service = Arc::new(StubInstanceService::new().on_delete(Ok(None)));
    let broker = build_broker(&service, EventFlowRegistries::default());

    let response = broker
        .instances()
        .delete_service_instance(fixtures::delete_instance("sd-retired", "plan-retired"))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, ResponseBody::Empty);

    let request = &service.deleted()[0];
    assert_eq!(request.service_definition_id, "sd-retired");
    assert_eq!(request.plan_id, "plan-retired");
    assert!(request.service_definition.id.is_empty());
    assert!(request.plan.is_none());
}

#[tokio::test]
async fn test_async_delete_is_accepted() {
    let service = Arc::new(StubInstanceService::new().on_delete(Ok(Some(
        DeleteServiceInstanceResponse {
            is_async: true,
            operation: Some("deprovision-9".to_string()),
        },
    ))));
    let broker = build_broker(&service, EventFlowRegistries::default());

    let response = broker
        .instances()
        .delete_service_instance(fixtures::delete_instance(SERVICE_ID, PLAN_ID).accepts_incomplete(true))
        .await;

    assert_eq!(response.status, StatusCode::ACCEPTED);
    assert_eq!(
        response.value().and_then(|value| value.operation.as_deref()),
        Some("deprovision-9")
    );
}

// ============================================================================
// Fetch
// ============================================================================

#[tokio::test]
async fn test_get_instance_found_and_missing() {
    let service = Arc::new(StubInstanceService::new().on_get(Ok(Some(GetServiceInstanceResponse {
        service_id: Some(SERVICE_ID.to_string()),
        plan_id: Some(PLAN_ID.to_string()),
        ..GetServiceInstanceResponse::default()
    }))));
    let broker = build_broker(&service, EventFlowRegistries::default());
    let response = broker.instances().get_service_instance(fixtures::get_instance()).await;
    assert_eq!(response.status, StatusCode::OK);

    let service = Arc::new(
        StubInstanceService::new().on_get(Err(ServiceBrokerError::instance_does_not_exist("instance-1"))),
    );
    let broker = build_broker(&service, EventFlowRegistries::default());
    let response = broker.instances().get_service_instance(fixtures::get_instance()).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Last operation
// ============================================================================

#[tokio::test]
async fn test_succeeded_delete_poll_is_gone_and_repeatable() {
    let log = FlowLog::new();
    let flows = EventFlowRegistries::default().with_async_operation(
        AsyncOperationEventFlowRegistry::new()
            .with_initialization_flow(RecordingFlow::new("init", &log))
            .with_completion_flow(RecordingFlow::new("complete", &log)),
    );
    let service = Arc::new(StubInstanceService::new().on_last_operation(Ok(Some(
        GetLastServiceOperationResponse {
            delete_operation: true,
            ..GetLastServiceOperationResponse::with_state(OperationState::Succeeded)
        },
    ))));
    let broker = build_broker(&service, flows);

    for _ in 0..3 {
        let response = broker.instances().get_last_operation(fixtures::last_operation()).await;
        assert_eq!(response.status, StatusCode::GONE);
    }
    assert_eq!(log.initialization_count(), 3);
    assert_eq!(log.completion_count(), 3);
}

#[tokio::test]
async fn test_poll_resolves_catalog_best_effort() {
    let service = Arc::new(StubInstanceService::new());
    let broker = build_broker(&service, EventFlowRegistries::default());

    let mut inbound = fixtures::last_operation();
    inbound.body = LastOperationQuery {
        service_id: Some("sd-unknown".to_string()),
        plan_id: Some(PLAN_ID.to_string()),
        operation: Some("provision-1".to_string()),
    };
    let response = broker.instances().get_last_operation(inbound).await;

    assert_eq!(response.status, StatusCode::OK);
    let request = &service.polled()[0];
    assert!(request.service_definition.is_none());
    assert!(request.plan.is_none());
    assert_eq!(request.operation.as_deref(), Some("provision-1"));
}

#[tokio::test]
async fn test_operation_in_progress_failure() {
    let service = Arc::new(StubInstanceService::new().on_last_operation(Err(
        ServiceBrokerError::operation_in_progress(Some("provision-1".to_string())),
    )));
    let broker = build_broker(&service, EventFlowRegistries::default());

    let response = broker.instances().get_last_operation(fixtures::last_operation()).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.error_message().and_then(|message| message.operation.as_deref()),
        Some("provision-1")
    );
    assert!(matches!(response.body, ResponseBody::Error(_)));
}
