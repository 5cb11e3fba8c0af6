//! HTTP handlers for catalogue and pricing endpoints.

use axum::extract::{Json, Path, Query, State};
use axum::response::IntoResponse;

use crate::domain::checkout::rental_days;
use crate::domain::pricing::{PricingEngine, ReservationPricingInput};

use super::super::error::ApiError;
use super::super::state::AppState;
use super::dto::{ProductListQuery, ProductListResponse, ReservationRequest};

/// GET /api/products - Resolve the catalogue through the tier chain
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let resolution = if query.available_only {
        state.resolver.resolve_for_sale().await?
    } else {
        state.resolver.resolve().await?
    };

    if resolution.is_degraded() {
        tracing::warn!(
            source = %resolution.origin,
            attempts = resolution.attempts.len(),
            "Serving degraded product data"
        );
    }

    Ok(Json(ProductListResponse::from(resolution)))
}

/// GET /api/products/:id - One bike
pub async fn get_product(
    State(state): State<AppState>,
    Path(bike_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bike = state.resolver.find_bike(&bike_id).await?;
    Ok(Json(bike))
}

/// GET /api/products/:id/variations - Sizes of one bike
pub async fn get_variations(
    State(state): State<AppState>,
    Path(bike_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let variations = state.resolver.variations_for(&bike_id).await?;
    Ok(Json(variations))
}

/// POST /api/pricing/validate - Price a reservation without booking it
///
/// Always 200 when every bike resolves; `is_valid` and `errors` carry the
/// verdict.
pub async fn validate_pricing(
    State(state): State<AppState>,
    Json(request): Json<ReservationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let bikes = state.selected_bikes(&request.bikes).await?;
    let input = ReservationPricingInput {
        bikes,
        total_days: rental_days(request.start_date, request.end_date),
        insurance: request.insurance.map(Into::into),
    };

    let validation = PricingEngine::new().validate(&input);
    if !validation.is_valid {
        tracing::debug!(errors = ?validation.errors, "Pricing preview rejected");
    }

    Ok(Json(validation))
}
