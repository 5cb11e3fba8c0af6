//! JSON error body and the mapping from application errors to HTTP statuses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::application::{CheckoutError, ResolutionError, SyncError};

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional details (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: Some(details),
        }
    }
}

/// API error type that converts application errors to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    Resolution(ResolutionError),
    Checkout(CheckoutError),
    Sync(SyncError),
    SyncDisabled,
    InvalidRequest(String),
}

impl From<ResolutionError> for ApiError {
    fn from(err: ResolutionError) -> Self {
        Self::Resolution(err)
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        Self::Checkout(err)
    }
}

impl From<SyncError> for ApiError {
    fn from(err: SyncError) -> Self {
        Self::Sync(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Resolution(ResolutionError::NotFound(id)) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("BIKE_NOT_FOUND", format!("Bike {} not found", id)),
            ),
            ApiError::Resolution(err @ ResolutionError::Exhausted { .. }) => {
                tracing::error!(error = %err, "Product resolution exhausted every tier");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorResponse::new("PRODUCTS_UNAVAILABLE", err.to_string()),
                )
            }
            ApiError::Checkout(CheckoutError::InvalidCustomer(err)) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("INVALID_CUSTOMER", err.message.clone()),
            ),
            ApiError::Checkout(CheckoutError::Pricing { errors, breakdown }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::with_details(
                    "PRICING_INVALID",
                    errors.join("; "),
                    serde_json::json!({ "errors": errors, "breakdown": breakdown }),
                ),
            ),
            ApiError::Checkout(err @ CheckoutError::Handoff(_)) => {
                tracing::error!(error = %err, "Checkout handoff failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("CHECKOUT_FAILED", err.to_string()),
                )
            }
            ApiError::Sync(err) => {
                tracing::error!(error = %err, "Manual sync failed");
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorResponse::new("SYNC_FAILED", err.to_string()),
                )
            }
            ApiError::SyncDisabled => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::new("SYNC_DISABLED", "Product sync is not configured"),
            ),
            ApiError::InvalidRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("INVALID_REQUEST", message),
            ),
        };

        (status, Json(body)).into_response()
    }
}
