//! Axum router configuration for operational endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::super::state::AppState;
use super::handlers::{connectivity_status, reset_connectivity, trigger_sync};

/// Create the operations router.
///
/// # Routes
/// - `POST /sync` - Manual sync
/// - `GET /connectivity` - Resilience snapshot
/// - `POST /connectivity/reset` - Reset every breaker and limiter
pub fn operations_routes() -> Router<AppState> {
    Router::new()
        .route("/sync", post(trigger_sync))
        .route("/connectivity", get(connectivity_status))
        .route("/connectivity/reset", post(reset_connectivity))
}
