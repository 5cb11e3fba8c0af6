//! HTTP adapters - REST API implementations.
//!
//! Each area has its own module with DTOs, handlers and routes; they share
//! one [`AppState`] and are mounted under `/api` by [`api_router`].

pub mod catalog;
pub mod checkout;
pub mod error;
pub mod operations;
pub mod state;

use axum::http::{HeaderValue, Method};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use catalog::catalog_routes;
pub use checkout::checkout_routes;
pub use error::{ApiError, ErrorResponse};
pub use operations::operations_routes;
pub use state::AppState;

use crate::config::ServerConfig;

/// CORS for the booking widget: GET/POST/OPTIONS from the listed origins,
/// or from anywhere when the list is empty.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Complete API router.
///
/// Every request carries an `x-request-id`, echoed on the response and
/// recorded on its trace span.
pub fn api_router(state: AppState, server: &ServerConfig) -> Router {
    let api = Router::new()
        .merge(catalog_routes())
        .merge(checkout_routes())
        .merge(operations_routes());

    Router::new()
        .nest("/api", api)
        .layer(TimeoutLayer::new(server.request_timeout()))
        .layer(CompressionLayer::new())
        .layer(cors_layer(&server.allowed_origins()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
