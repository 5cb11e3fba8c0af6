//! Axum router configuration for catalogue and pricing endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::super::state::AppState;
use super::handlers::{get_product, get_variations, list_products, validate_pricing};

/// Create the catalogue router.
///
/// # Routes
/// - `GET /products` - Product list, `?available_only=true` drops out-of-stock bikes
/// - `GET /products/:id` - One bike
/// - `GET /products/:id/variations` - Sizes of one bike
/// - `POST /pricing/validate` - Pricing preview
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
        .route("/products/:id/variations", get(get_variations))
        .route("/pricing/validate", post(validate_pricing))
}
