//! HTTP handlers for sync and connectivity operations.

use axum::extract::{Json, State};
use axum::response::IntoResponse;

use crate::application::SyncOutcome;

use super::super::error::ApiError;
use super::super::state::AppState;

/// POST /api/sync - Run one commerce-to-database sync now
pub async fn trigger_sync(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let sync = state.sync.as_ref().ok_or(ApiError::SyncDisabled)?;
    let outcome = sync.sync_once().await?;

    match &outcome {
        SyncOutcome::Completed(report) => tracing::info!(
            run_id = %report.run_id,
            products = report.products,
            failed = report.failed,
            "Manual sync completed"
        ),
        SyncOutcome::Skipped { reason } => {
            tracing::info!(reason = reason.as_str(), "Manual sync skipped")
        }
    }

    Ok(Json(outcome))
}

/// GET /api/connectivity - Breakers, limiters and network health
pub async fn connectivity_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.resilience.snapshot())
}

/// POST /api/connectivity/reset - Close every breaker and clear every window
pub async fn reset_connectivity(State(state): State<AppState>) -> impl IntoResponse {
    state.resilience.reset_all();
    tracing::info!("Connectivity state reset");
    Json(state.resilience.snapshot())
}
