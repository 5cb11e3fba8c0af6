//! HTTP handler for checkout submission.

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::domain::checkout::{CheckoutHandoff, Reservation};

use super::super::error::ApiError;
use super::super::state::AppState;
use super::dto::{CheckoutRequest, CheckoutResponse};

/// POST /api/checkout - Price the reservation and hand it to the shop
///
/// 201 when an order was created, 200 when the customer is sent to the
/// storefront checkout instead. The CRM notification keeps running after the
/// response is sent.
pub async fn submit_checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let bikes = state.selected_bikes(&request.reservation.bikes).await?;
    let reservation = Reservation {
        start_date: request.reservation.start_date,
        end_date: request.reservation.end_date,
        pickup_time: request.pickup_time,
        return_time: request.return_time,
        bikes,
        insurance: request.reservation.insurance.map(Into::into),
        customer: request.customer,
    };

    let result = state.checkout.handle(reservation).await?;

    let status = match &result.handoff {
        CheckoutHandoff::Order { .. } => StatusCode::CREATED,
        CheckoutHandoff::FallbackUrl { .. } => StatusCode::OK,
    };

    Ok((status, Json(CheckoutResponse::from(result))))
}
