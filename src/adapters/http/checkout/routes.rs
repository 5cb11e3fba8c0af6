//! Axum router configuration for checkout.

use axum::{routing::post, Router};

use super::super::state::AppState;
use super::handlers::submit_checkout;

/// Create the checkout router.
///
/// # Routes
/// - `POST /checkout` - Submit a reservation
pub fn checkout_routes() -> Router<AppState> {
    Router::new().route("/checkout", post(submit_checkout))
}
