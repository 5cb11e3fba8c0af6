//! Where the customer goes to pay, and what the CRM hears about it.

use reqwest::Url;
use serde::Serialize;

use crate::domain::foundation::{DomainError, ErrorCode, Money, Timestamp};
use crate::domain::pricing::PricingBreakdown;

use super::{CreatedOrder, Customer, Reservation};

/// Result of a checkout submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckoutHandoff {
    /// Order created; the customer pays on the pay-for-order page.
    Order {
        order_id: u64,
        order_key: String,
        payment_url: String,
    },
    /// Order creation failed; the storefront checkout receives the
    /// reservation as query parameters instead.
    FallbackUrl { checkout_url: String, reason: String },
}

impl CheckoutHandoff {
    pub fn redirect_url(&self) -> &str {
        match self {
            CheckoutHandoff::Order { payment_url, .. } => payment_url,
            CheckoutHandoff::FallbackUrl { checkout_url, .. } => checkout_url,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            CheckoutHandoff::Order { .. } => "order",
            CheckoutHandoff::FallbackUrl { .. } => "fallback_url",
        }
    }

    pub fn order_id(&self) -> Option<u64> {
        match self {
            CheckoutHandoff::Order { order_id, .. } => Some(*order_id),
            CheckoutHandoff::FallbackUrl { .. } => None,
        }
    }
}

fn storefront_url(site_url: &str, path: &str) -> Result<Url, DomainError> {
    let base = site_url.trim().trim_end_matches('/');
    Url::parse(&format!("{}/{}", base, path)).map_err(|e| {
        DomainError::new(
            ErrorCode::InvalidFormat,
            format!("Invalid storefront URL '{}': {}", site_url, e),
        )
    })
}

/// `{site}/checkout/order-pay/{id}/?pay_for_order=true&key={order_key}`
pub fn pay_for_order_url(site_url: &str, order: &CreatedOrder) -> Result<Url, DomainError> {
    let mut url = storefront_url(site_url, &format!("checkout/order-pay/{}/", order.id))?;
    url.query_pairs_mut()
        .append_pair("pay_for_order", "true")
        .append_pair("key", &order.order_key);
    Ok(url)
}

/// Storefront checkout URL carrying the reservation and its totals.
pub fn fallback_checkout_url(
    site_url: &str,
    reservation: &Reservation,
    breakdown: &PricingBreakdown,
) -> Result<Url, DomainError> {
    let bikes = breakdown
        .lines
        .iter()
        .map(|line| match &line.size {
            Some(size) => format!("{}x{}({})", line.bike_id, line.quantity, size),
            None => format!("{}x{}", line.bike_id, line.quantity),
        })
        .collect::<Vec<_>>()
        .join(",");

    let mut url = storefront_url(site_url, "checkout/")?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("rental_start", &reservation.start_date.to_string())
            .append_pair("rental_end", &reservation.end_date.to_string())
            .append_pair("rental_days", &breakdown.total_days.to_string())
            .append_pair("bikes", &bikes)
            .append_pair("bikes_total", &breakdown.bikes_total.to_decimal_string())
            .append_pair(
                "insurance_total",
                &breakdown.insurance_total.to_decimal_string(),
            )
            .append_pair("total", &breakdown.grand_total.to_decimal_string())
            .append_pair("billing_first_name", reservation.customer.first_name.trim())
            .append_pair("billing_last_name", reservation.customer.last_name.trim())
            .append_pair("billing_email", reservation.customer.email.trim());
        if let Some(insurance) = &breakdown.insurance {
            query.append_pair("insurance", &insurance.name);
        }
    }
    Ok(url)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrmRental {
    pub start_date: String,
    pub end_date: String,
    pub days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrmBike {
    pub id: String,
    pub name: String,
    pub size: Option<String>,
    pub quantity: u32,
    pub price_per_day: Money,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrmInsurance {
    pub name: String,
    pub total: Money,
    pub included: bool,
}

/// Webhook body describing a submitted reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrmPayload {
    pub event: String,
    pub customer: Customer,
    pub rental: CrmRental,
    pub bikes: Vec<CrmBike>,
    pub insurance: Option<CrmInsurance>,
    pub total: Money,
    pub handoff: String,
    pub order_id: Option<u64>,
    pub submitted_at: Timestamp,
}

impl CrmPayload {
    pub fn new(
        reservation: &Reservation,
        breakdown: &PricingBreakdown,
        handoff: &CheckoutHandoff,
        submitted_at: Timestamp,
    ) -> Self {
        Self {
            event: "reservation.submitted".to_string(),
            customer: reservation.customer.clone(),
            rental: CrmRental {
                start_date: reservation.start_date.to_string(),
                end_date: reservation.end_date.to_string(),
                days: breakdown.total_days,
                pickup_time: reservation.pickup_time.clone(),
                return_time: reservation.return_time.clone(),
            },
            bikes: breakdown
                .lines
                .iter()
                .map(|line| CrmBike {
                    id: line.bike_id.clone(),
                    name: line.name.clone(),
                    size: line.size.clone(),
                    quantity: line.quantity,
                    price_per_day: line.price_per_day,
                    total: line.total,
                })
                .collect(),
            insurance: breakdown.insurance.as_ref().map(|line| CrmInsurance {
                name: line.name.clone(),
                total: line.total,
                included: line.included,
            }),
            total: breakdown.grand_total,
            handoff: handoff.kind().to_string(),
            order_id: handoff.order_id(),
            submitted_at,
        }
    }
}
