//! Prometheus metrics for the broker pipeline.
//!
//! Recorded for every request:
//! - `broker.requests.total{operation,status}`
//! - `broker.request.duration_seconds{operation}`
//! - `broker.flows.failures.total{operation,phase}`
//!
//! # Example
//!
//! ```rust,no_run
//! use service_broker_runtime::metrics::MetricsServer;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut server = MetricsServer::new("0.0.0.0:9090".parse()?);
//! server.start()?;
//!
//! if let Some(text) = server.render() {
//!     println!("{text}");
//! }
//! # Ok(())
//! # }
//! ```

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use service_broker_core::OperationKind;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub use metrics::{counter, histogram};

/// Requests handled, by operation and status code.
pub const REQUESTS_TOTAL: &str = "broker.requests.total";
/// Request latency, by operation.
pub const REQUEST_DURATION_SECONDS: &str = "broker.request.duration_seconds";
/// Failed hooks, by operation and phase.
pub const FLOW_FAILURES_TOTAL: &str = "broker.flows.failures.total";

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
    /// Failed to bind HTTP server
    #[error("Failed to bind metrics server: {0}")]
    Bind(#[from] std::io::Error),
}

/// Prometheus recorder plus the address its scrape endpoint is served on.
pub struct MetricsServer {
    addr: SocketAddr,
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    /// Create a new metrics server.
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr, handle: None }
    }

    /// Address the scrape endpoint should be served on.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Install the global Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns error if the exporter cannot be built or installed.
    ///
    /// If a recorder is already installed (e.g. by another test), this logs a
    /// warning and leaves [`Self::handle`] empty.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!(addr = %self.addr, "Metrics recorder installed");
                Ok(())
            }
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            }
        }
    }

    /// Get the metrics handle for rendering.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus format.
    ///
    /// Returns `None` if the recorder was not installed by this server.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

fn register_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Total number of broker requests, by operation and status");
    describe_histogram!(REQUEST_DURATION_SECONDS, "Time taken to process a broker request");
    describe_counter!(
        FLOW_FAILURES_TOTAL,
        "Total number of failed event flow hooks, by operation and phase"
    );
}

/// Pipeline metrics recorder.
pub struct PipelineMetrics;

impl PipelineMetrics {
    /// Record a finished request.
    pub fn record_request(operation: OperationKind, status: u16, duration: Duration) {
        counter!(REQUESTS_TOTAL, "operation" => operation.as_str(), "status" => status.to_string())
            .increment(1);
        histogram!(REQUEST_DURATION_SECONDS, "operation" => operation.as_str())
            .record(duration.as_secs_f64());
    }

    /// Record failed hooks in a phase.
    pub fn record_flow_failures(operation: OperationKind, phase: &'static str, count: usize) {
        if count > 0 {
            counter!(FLOW_FAILURES_TOTAL, "operation" => operation.as_str(), "phase" => phase)
                .increment(count as u64);
        }
    }
}
