//! The per-request pipeline shared by every operation.
//!
//! `initialization flows → service → completion flows`, with error flows run
//! exactly once if any of the three fails. The outcome is then mapped to a
//! [`BrokerResponse`] and recorded.

use crate::mapper::{self, ResponseStatus};
use crate::metrics::PipelineMetrics;
use crate::response::BrokerResponse;
use service_broker_core::{EventFlowRegistry, FlowPhase, OperationKind, ServiceBrokerError};
use std::future::Future;
use std::time::Instant;

/// Outcome of the business service: a response, nothing, or a failure.
pub type Outcome<Resp> = Result<Option<Resp>, ServiceBrokerError>;

/// Run hooks and the service for an enriched request.
///
/// `invoke` is called at most once, and only after every initialization hook
/// succeeded.
pub(crate) async fn run_with_flows<Req, Resp, F, Fut>(
    operation: OperationKind,
    flows: &EventFlowRegistry<Req, Resp>,
    request: &Req,
    invoke: F,
) -> Outcome<Resp>
where
    Req: Sync,
    Resp: Default + Sync,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Outcome<Resp>>,
{
    let outcome = run_stages(flows, request, invoke).await;

    if let Err(error) = &outcome {
        if let ServiceBrokerError::HookFailure { phase, .. } = error {
            PipelineMetrics::record_flow_failures(operation, phase.as_str(), 1);
        }
        tracing::debug!(error = %error, "Running error flows");
        let swallowed = flows.run_error(request, error).await;
        PipelineMetrics::record_flow_failures(operation, "error", swallowed);
    }

    outcome
}

async fn run_stages<Req, Resp, F, Fut>(
    flows: &EventFlowRegistry<Req, Resp>,
    request: &Req,
    invoke: F,
) -> Outcome<Resp>
where
    Req: Sync,
    Resp: Default + Sync,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Outcome<Resp>>,
{
    flows.run_initialization(request).await?;
    tracing::trace!(phase = %FlowPhase::Initialization, "Flows completed");

    let response = invoke().await?;
    tracing::debug!(empty = response.is_none(), "Service returned");

    match &response {
        Some(response) => flows.run_completion(request, response).await?,
        None => flows.run_completion(request, &Resp::default()).await?,
    }
    tracing::trace!(phase = %FlowPhase::Completion, "Flows completed");

    Ok(response)
}

/// Map an outcome, log failures and record request metrics.
pub(crate) fn respond<Resp: ResponseStatus>(
    operation: OperationKind,
    started: Instant,
    outcome: Outcome<Resp>,
) -> BrokerResponse<Resp> {
    if let Err(error) = &outcome {
        let status = mapper::failure_status(operation, error);
        if status.is_server_error() {
            tracing::error!(error = %error, kind = error.kind(), status = status.as_u16(), "Broker request failed");
        } else {
            tracing::info!(error = %error, kind = error.kind(), status = status.as_u16(), "Broker request rejected");
        }
    }

    let response = mapper::map_outcome(operation, outcome);
    PipelineMetrics::record_request(operation, response.status.as_u16(), started.elapsed());
    tracing::debug!(status = response.status.as_u16(), "Request completed");
    response
}
