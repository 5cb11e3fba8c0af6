//! HTTP DTOs for the catalogue and pricing endpoints.
//!
//! Money fields are integer cents on the wire.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::application::{Resolution, TierAttempt};
use crate::domain::catalog::Bike;
use crate::domain::foundation::Money;
use crate::domain::pricing::InsuranceSelection;
use crate::ports::ProductOrigin;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Query string for `GET /api/products`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductListQuery {
    /// Drop bikes with no stock.
    #[serde(default)]
    pub available_only: bool,
}

/// One bike picked in the booking UI.
#[derive(Debug, Clone, Deserialize)]
pub struct BikeSelectionRequest {
    pub bike_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub size: Option<String>,
    /// Rate the UI showed; compared against the authoritative rate.
    #[serde(default)]
    pub displayed_price_per_day: Option<Money>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InsuranceRequest {
    pub name: String,
    pub price_per_bike_per_day: Money,
}

impl From<InsuranceRequest> for InsuranceSelection {
    fn from(request: InsuranceRequest) -> Self {
        Self {
            name: request.name,
            price_per_bike_per_day: request.price_per_bike_per_day,
        }
    }
}

/// Dates, bikes and insurance: everything pricing needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ReservationRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub bikes: Vec<BikeSelectionRequest>,
    #[serde(default)]
    pub insurance: Option<InsuranceRequest>,
}

fn default_quantity() -> u32 {
    1
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for the product list.
#[derive(Debug, Clone, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<Bike>,
    pub count: usize,
    /// Tier that answered.
    pub source: ProductOrigin,
    /// True when serving a fallback snapshot or the static list.
    pub degraded: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<TierAttempt>,
}

impl From<Resolution> for ProductListResponse {
    fn from(resolution: Resolution) -> Self {
        let degraded = resolution.is_degraded();
        Self {
            count: resolution.products.len(),
            products: resolution.products,
            source: resolution.origin,
            degraded,
            attempts: resolution.attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_defaults_to_one_bike() {
        let request: BikeSelectionRequest =
            serde_json::from_str(r#"{ "bike_id": "9001" }"#).unwrap();
        assert_eq!(request.quantity, 1);
        assert!(request.size.is_none());
        assert!(request.displayed_price_per_day.is_none());
    }

    #[test]
    fn reservation_request_parses_iso_dates_and_cents() {
        let request: ReservationRequest = serde_json::from_str(
            r#"{
                "start_date": "2026-05-01",
                "end_date": "2026-05-03",
                "bikes": [{ "bike_id": "9001", "quantity": 2, "displayed_price_per_day": 2500 }],
                "insurance": { "name": "Premium", "price_per_bike_per_day": 500 }
            }"#,
        )
        .unwrap();
        assert_eq!(request.bikes[0].displayed_price_per_day, Some(Money::from_cents(2500)));
        let insurance: InsuranceSelection = request.insurance.unwrap().into();
        assert_eq!(insurance.price_per_bike_per_day, Money::from_cents(500));
    }

    #[test]
    fn list_response_marks_static_data_degraded() {
        let response = ProductListResponse::from(Resolution {
            products: Vec::new(),
            origin: ProductOrigin::Static,
            attempts: Vec::new(),
        });
        assert!(response.degraded);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["source"], "static");
        assert!(json.get("attempts").is_none());
    }
}
