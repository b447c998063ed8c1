//! Catalog endpoint.

use crate::state::AppState;
use axum::{extract::State, Json};
use service_broker_core::Catalog;
use std::sync::Arc;

/// Serve the broker catalog.
///
/// # Endpoint
///
/// ```text
/// GET /v2/catalog
/// ```
pub async fn get_catalog(State(state): State<AppState>) -> Json<Arc<Catalog>> {
    let catalog = state.broker().catalog().get_catalog().await;
    tracing::debug!(services = catalog.services.len(), "Serving catalog");
    Json(catalog)
}
