//! HTTP-level tests for the broker routes

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use service_broker_core::{
    CreateServiceInstanceBindingResponse, GetLastServiceOperationResponse, OperationKind,
    OperationState, ServiceBrokerError,
};
use service_broker_runtime::ServiceBroker;
use service_broker_testing::fixtures::{self, BINDING_ID, INSTANCE_ID, PLAN_ID, SERVICE_ID};
use service_broker_testing::{StubBindingService, StubInstanceService};
use service_broker_web::{app, build_router, AppState, BrokerConfig};
use std::sync::Arc;
use tower::ServiceExt;

fn router(instances: &Arc<StubInstanceService>, bindings: Option<&Arc<StubBindingService>>) -> Router {
    service_broker_testing::helpers::init_test_tracing();
    let mut builder = ServiceBroker::builder(fixtures::in_memory_catalog(), Arc::clone(instances) as _);
    if let Some(bindings) = bindings {
        builder = builder.binding_service(Arc::clone(bindings) as _);
    }
    build_router(AppState::new(builder.build()))
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response: Response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn provision_body() -> Value {
    json!({
        "service_id": SERVICE_ID,
        "plan_id": PLAN_ID,
        "organization_guid": "org-1",
        "space_guid": "space-1",
        "parameters": { "size": "small" }
    })
}

#[tokio::test]
async fn test_catalog_served_with_and_without_platform_prefix() {
    let instances = Arc::new(StubInstanceService::new());

    for uri in ["/v2/catalog", "/cf-eu-1/v2/catalog"] {
        let (status, body) = send(router(&instances, None), request(Method::GET, uri, None)).await;

        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["services"][0]["id"], SERVICE_ID);
    }
}

#[tokio::test]
async fn test_provision_builds_request_from_path_query_headers_and_body() {
    let instances = Arc::new(StubInstanceService::new().on_create(Ok(None)));
    let identity = format!("cloudfoundry {}", STANDARD.encode(r#"{"user_id":"u-1"}"#));
    let mut req = request(
        Method::PUT,
        &format!("/cf-eu-1/v2/service_instances/{INSTANCE_ID}?accepts_incomplete=true"),
        Some(provision_body()),
    );
    req.headers_mut()
        .insert("X-Broker-API-Originating-Identity", identity.parse().unwrap());
    req.headers_mut()
        .insert("X-Api-Info-Location", "api.example.com/v2/info".parse().unwrap());

    let (status, body) = send(router(&instances, None), req).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({}));

    let created = &instances.created()[0];
    assert_eq!(created.service_instance_id, INSTANCE_ID);
    assert!(created.async_accepted);
    assert_eq!(created.parameters["size"], "small");
    assert_eq!(created.envelope.platform_instance_id.as_deref(), Some("cf-eu-1"));
    assert_eq!(
        created.envelope.api_info_location.as_deref(),
        Some("api.example.com/v2/info")
    );
    let identity = created.envelope.originating_identity.as_ref().unwrap();
    assert_eq!(identity.platform, "cloudfoundry");
    assert_eq!(identity.properties["user_id"], "u-1");
}

#[tokio::test]
async fn test_unreadable_body_is_unprocessable_and_never_reaches_the_service() {
    let instances = Arc::new(StubInstanceService::new());
    let req = Request::builder()
        .method(Method::PUT)
        .uri(format!("/v2/service_instances/{INSTANCE_ID}"))
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let (status, body) = send(router(&instances, None), req).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["description"].is_string());
    assert_eq!(instances.calls().total(), 0);
}

#[tokio::test]
async fn test_missing_required_body_field_is_unprocessable() {
    let instances = Arc::new(StubInstanceService::new());

    let (status, _) = send(
        router(&instances, None),
        request(
            Method::PUT,
            &format!("/v2/service_instances/{INSTANCE_ID}"),
            Some(json!({ "service_id": SERVICE_ID })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(instances.calls().total(), 0);
}

#[tokio::test]
async fn test_malformed_identity_header_is_unprocessable() {
    let instances = Arc::new(StubInstanceService::new());
    let mut req = request(
        Method::PUT,
        &format!("/v2/service_instances/{INSTANCE_ID}"),
        Some(provision_body()),
    );
    req.headers_mut()
        .insert("X-Broker-API-Originating-Identity", "cloudfoundry".parse().unwrap());

    let (status, body) = send(router(&instances, None), req).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["description"]
        .as_str()
        .unwrap()
        .contains("X-Broker-API-Originating-Identity"));
    assert_eq!(instances.calls().total(), 0);
}

#[tokio::test]
async fn test_unknown_plan_maps_to_unprocessable_with_description() {
    let instances = Arc::new(StubInstanceService::new());

    let (status, body) = send(
        router(&instances, None),
        request(
            Method::PUT,
            &format!("/v2/service_instances/{INSTANCE_ID}"),
            Some(json!({ "service_id": SERVICE_ID, "plan_id": "plan-unknown" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["description"],
        "Service definition plan does not exist: id=plan-unknown"
    );
}

#[tokio::test]
async fn test_delete_requires_service_and_plan_query() {
    let instances = Arc::new(StubInstanceService::new());

    let (status, _) = send(
        router(&instances, None),
        request(Method::DELETE, &format!("/v2/service_instances/{INSTANCE_ID}"), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(instances.calls().total(), 0);
}

#[tokio::test]
async fn test_delete_missing_instance_is_gone() {
    let instances = Arc::new(
        StubInstanceService::new()
            .on_delete(Err(ServiceBrokerError::instance_does_not_exist(INSTANCE_ID))),
    );

    let (status, body) = send(
        router(&instances, None),
        request(
            Method::DELETE,
            &format!("/v2/service_instances/{INSTANCE_ID}?service_id={SERVICE_ID}&plan_id={PLAN_ID}"),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::GONE);
    assert_eq!(
        body["description"],
        format!("Service instance does not exist: id={INSTANCE_ID}")
    );
    assert_eq!(instances.calls().get(OperationKind::DeleteInstance), 1);
}

#[tokio::test]
async fn test_last_operation_after_delete_is_gone() {
    let instances = Arc::new(StubInstanceService::new().on_last_operation(Ok(Some(
        GetLastServiceOperationResponse {
            delete_operation: true,
            ..GetLastServiceOperationResponse::with_state(OperationState::Succeeded)
        },
    ))));

    let (status, body) = send(
        router(&instances, None),
        request(
            Method::GET,
            &format!("/v2/service_instances/{INSTANCE_ID}/last_operation?operation=op-1"),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["state"], "succeeded");
    assert_eq!(instances.polled()[0].operation.as_deref(), Some("op-1"));
}

#[tokio::test]
async fn test_binding_routes_absent_without_binding_service() {
    let instances = Arc::new(StubInstanceService::new());

    let (status, _) = send(
        router(&instances, None),
        request(
            Method::GET,
            &format!("/v2/service_instances/{INSTANCE_ID}/service_bindings/{BINDING_ID}"),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bind_returns_credentials() {
    let instances = Arc::new(StubInstanceService::new());
    let bindings = Arc::new(StubBindingService::new().on_create(Ok(Some(
        CreateServiceInstanceBindingResponse {
            credentials: json!({ "password": "s3cret" }).as_object().cloned(),
            ..CreateServiceInstanceBindingResponse::default()
        },
    ))));

    let (status, body) = send(
        router(&instances, Some(&bindings)),
        request(
            Method::PUT,
            &format!("/v2/service_instances/{INSTANCE_ID}/service_bindings/{BINDING_ID}"),
            Some(json!({ "service_id": SERVICE_ID, "plan_id": PLAN_ID, "app_guid": "app-1" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["credentials"]["password"], "s3cret");
    assert_eq!(bindings.created()[0].app_guid.as_deref(), Some("app-1"));
}

#[tokio::test]
async fn test_unbind_missing_binding_is_gone() {
    let instances = Arc::new(StubInstanceService::new());
    let bindings = Arc::new(
        StubBindingService::new().on_delete(Err(ServiceBrokerError::binding_does_not_exist(BINDING_ID))),
    );

    let (status, _) = send(
        router(&instances, Some(&bindings)),
        request(
            Method::DELETE,
            &format!(
                "/v2/service_instances/{INSTANCE_ID}/service_bindings/{BINDING_ID}?service_id={SERVICE_ID}&plan_id={PLAN_ID}"
            ),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::GONE);
}

#[tokio::test]
async fn test_app_enforces_api_version_and_echoes_request_identity() {
    let instances = Arc::new(StubInstanceService::new());
    let broker = ServiceBroker::builder(fixtures::in_memory_catalog(), Arc::clone(&instances) as _).build();
    let config = BrokerConfig {
        api_version: "2.13".to_string(),
        ..BrokerConfig::default()
    };
    let app = app(broker, &config);

    let mut req = request(Method::GET, "/v2/catalog", None);
    req.headers_mut()
        .insert("X-Broker-API-Version", "2.12".parse().unwrap());
    req.headers_mut()
        .insert("X-Broker-API-Request-Identity", "req-1".parse().unwrap());
    let response = app.clone().oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    assert_eq!(
        response.headers().get("X-Broker-API-Request-Identity").unwrap(),
        "req-1"
    );

    let mut req = request(Method::GET, "/v2/catalog", None);
    req.headers_mut()
        .insert("X-Broker-API-Version", "2.13".parse().unwrap());
    let (status, _) = send(app, req).await;

    assert_eq!(status, StatusCode::OK);
}
