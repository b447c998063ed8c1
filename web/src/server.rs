//! Router assembly and the HTTP server loop.

use crate::config::BrokerConfig;
use crate::handlers::{bindings, catalog, instances};
use crate::middleware::{request_identity_layer, ApiVersionLayer};
use crate::state::AppState;
use anyhow::Context as _;
use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use service_broker_runtime::metrics::MetricsServer;
use service_broker_runtime::ServiceBroker;
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Build the broker API routes, without middleware.
///
/// Every route is served both at `/v2/...` and under a
/// `/:platform_instance_id/v2/...` prefix. Binding routes exist only when the
/// broker has a binding service.
pub fn build_router(state: AppState) -> Router {
    let mut v2 = Router::new()
        .route("/v2/catalog", get(catalog::get_catalog))
        .route(
            "/v2/service_instances/:instance_id",
            get(instances::get_service_instance)
                .put(instances::create_service_instance)
                .patch(instances::update_service_instance)
                .delete(instances::delete_service_instance),
        )
        .route(
            "/v2/service_instances/:instance_id/last_operation",
            get(instances::get_last_operation),
        );

    if state.broker().bindings().is_some() {
        v2 = v2
            .route(
                "/v2/service_instances/:instance_id/service_bindings/:binding_id",
                get(bindings::get_service_instance_binding)
                    .put(bindings::create_service_instance_binding)
                    .delete(bindings::delete_service_instance_binding),
            )
            .route(
                "/v2/service_instances/:instance_id/service_bindings/:binding_id/last_operation",
                get(bindings::get_last_operation),
            );
    }

    Router::new()
        .merge(v2.clone())
        .nest("/:platform_instance_id", v2)
        .with_state(state)
}

/// Build the full application: routes plus version check, request identity
/// and HTTP tracing.
pub fn app(broker: ServiceBroker, config: &BrokerConfig) -> Router {
    build_router(AppState::new(broker))
        .layer(ApiVersionLayer::new(&config.api_version))
        .layer(request_identity_layer())
        .layer(TraceLayer::new_for_http())
}

/// Router serving the Prometheus scrape endpoint.
pub fn metrics_router(metrics: Arc<MetricsServer>) -> Router {
    Router::new().route(
        "/metrics",
        get(move || {
            let metrics = Arc::clone(&metrics);
            async move {
                let content_type = [(header::CONTENT_TYPE, "text/plain; charset=utf-8")];
                match metrics.render() {
                    Some(text) => (StatusCode::OK, content_type, text).into_response(),
                    None => (
                        StatusCode::SERVICE_UNAVAILABLE,
                        content_type,
                        "Metrics not initialized",
                    )
                        .into_response(),
                }
            }
        }),
    )
}

/// Run the broker until Ctrl+C or SIGTERM.
///
/// # Errors
///
/// Returns an error if a listener cannot be bound, the metrics recorder cannot
/// be installed, or the server fails.
pub async fn serve(broker: ServiceBroker, config: BrokerConfig) -> anyhow::Result<()> {
    if let Some(metrics_addr) = config.metrics_addr {
        let mut metrics = MetricsServer::new(metrics_addr);
        metrics.start()?;

        let listener = tokio::net::TcpListener::bind(metrics.addr())
            .await
            .with_context(|| format!("failed to bind metrics listener on {metrics_addr}"))?;
        let router = metrics_router(Arc::new(metrics));
        info!(address = %metrics_addr, "Metrics endpoint listening");

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                error!(error = %e, "Metrics server failed");
            }
        });
    }

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    info!(
        address = %addr,
        api_version = %config.api_version,
        bindings = broker.bindings().is_some(),
        "Service broker listening"
    );

    axum::serve(listener, app(broker, &config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Service broker stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
