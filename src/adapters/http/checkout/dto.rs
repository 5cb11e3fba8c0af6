//! HTTP DTOs for checkout.

use serde::{Deserialize, Serialize};

use crate::application::SubmitCheckoutResult;
use crate::domain::checkout::{CheckoutHandoff, Customer};
use crate::domain::pricing::PricingBreakdown;

use super::super::catalog::ReservationRequest;

/// Request to book a reservation.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    #[serde(flatten)]
    pub reservation: ReservationRequest,
    #[serde(default)]
    pub pickup_time: Option<String>,
    #[serde(default)]
    pub return_time: Option<String>,
    pub customer: Customer,
}

/// Where to send the customer, plus the totals that were charged.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    pub handoff: CheckoutHandoff,
    pub redirect_url: String,
    pub breakdown: PricingBreakdown,
}

impl From<SubmitCheckoutResult> for CheckoutResponse {
    fn from(result: SubmitCheckoutResult) -> Self {
        Self {
            redirect_url: result.handoff.redirect_url().to_string(),
            handoff: result.handoff,
            breakdown: result.breakdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkout_request_flattens_reservation_fields() {
        let request: CheckoutRequest = serde_json::from_str(
            r#"{
                "start_date": "2026-06-10",
                "end_date": "2026-06-12",
                "pickup_time": "09:00",
                "bikes": [{ "bike_id": "9002", "size": "M" }],
                "customer": {
                    "first_name": "Ana",
                    "last_name": "García",
                    "email": "ana@example.com"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(request.reservation.bikes.len(), 1);
        assert_eq!(request.reservation.bikes[0].size.as_deref(), Some("M"));
        assert_eq!(request.pickup_time.as_deref(), Some("09:00"));
        assert!(request.return_time.is_none());
        assert!(request.reservation.insurance.is_none());
        assert!(request.customer.phone.is_none());
    }
}
