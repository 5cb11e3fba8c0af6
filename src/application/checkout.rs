//! SubmitCheckoutHandler - prices a reservation and hands it to the store.
//!
//! The pricing engine is the single source of truth for every amount sent
//! out. Order creation failures never fail the checkout: the customer gets
//! the storefront checkout URL with the reservation encoded instead.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::domain::checkout::{
    fallback_checkout_url, pay_for_order_url, CheckoutHandoff, CrmPayload, OrderDraft, Reservation,
};
use crate::domain::foundation::DomainError;
use crate::domain::pricing::{PricingBreakdown, PricingEngine};
use crate::ports::{Clock, CommerceApi, CrmNotifier};

/// Storefront settings for the handoff URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
    pub site_url: String,
    pub currency: String,
}

/// Result of a successful submission.
#[derive(Debug, Serialize)]
pub struct SubmitCheckoutResult {
    pub handoff: CheckoutHandoff,
    pub breakdown: PricingBreakdown,
    /// CRM notification task; awaiting it is optional.
    #[serde(skip)]
    pub crm_notification: Option<JoinHandle<()>>,
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("invalid customer details: {0}")]
    InvalidCustomer(DomainError),

    #[error("reservation cannot be priced: {}", errors.join("; "))]
    Pricing {
        errors: Vec<String>,
        breakdown: PricingBreakdown,
    },

    #[error("checkout handoff could not be built: {0}")]
    Handoff(DomainError),
}

pub struct SubmitCheckoutHandler {
    commerce: Arc<dyn CommerceApi>,
    crm: Arc<dyn CrmNotifier>,
    clock: Arc<dyn Clock>,
    engine: PricingEngine,
    settings: CheckoutSettings,
}

impl SubmitCheckoutHandler {
    pub fn new(
        commerce: Arc<dyn CommerceApi>,
        crm: Arc<dyn CrmNotifier>,
        clock: Arc<dyn Clock>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            commerce,
            crm,
            clock,
            engine: PricingEngine::new(),
            settings,
        }
    }

    pub async fn handle(&self, reservation: Reservation) -> Result<SubmitCheckoutResult, CheckoutError> {
        // 1. Validate customer and pricing
        reservation
            .customer
            .validate()
            .map_err(CheckoutError::InvalidCustomer)?;

        let validation = self.engine.validate(&reservation.pricing_input());
        if !validation.is_valid {
            return Err(CheckoutError::Pricing {
                errors: validation.errors,
                breakdown: validation.breakdown,
            });
        }
        let breakdown = validation.breakdown;
        for line in breakdown.lines.iter().filter(|line| line.price_corrected) {
            tracing::info!(
                bike_id = %line.bike_id,
                displayed = ?line.displayed_price_per_day,
                charged = %line.price_per_day,
                "Displayed price corrected at checkout"
            );
        }

        // 2. Direct order, falling back to the checkout URL
        let handoff = match self.create_order(&reservation, &breakdown).await {
            Ok(handoff) => handoff,
            Err(reason) => {
                tracing::warn!(reason = %reason, "Order creation failed, using fallback checkout URL");
                let url = fallback_checkout_url(&self.settings.site_url, &reservation, &breakdown)
                    .map_err(CheckoutError::Handoff)?;
                CheckoutHandoff::FallbackUrl {
                    checkout_url: url.to_string(),
                    reason,
                }
            }
        };

        // 3. Tell the CRM without holding up the customer
        let payload = CrmPayload::new(&reservation, &breakdown, &handoff, self.clock.now());
        let crm_notification = Some(self.notify_crm(payload));

        Ok(SubmitCheckoutResult {
            handoff,
            breakdown,
            crm_notification,
        })
    }

    async fn create_order(
        &self,
        reservation: &Reservation,
        breakdown: &PricingBreakdown,
    ) -> Result<CheckoutHandoff, String> {
        let draft = OrderDraft::build(reservation, breakdown, &self.settings.currency)
            .map_err(|e| e.to_string())?;
        let created = self
            .commerce
            .create_order(&draft)
            .await
            .map_err(|e| e.to_string())?;
        let payment_url =
            pay_for_order_url(&self.settings.site_url, &created).map_err(|e| e.to_string())?;

        Ok(CheckoutHandoff::Order {
            order_id: created.id,
            order_key: created.order_key,
            payment_url: payment_url.to_string(),
        })
    }

    fn notify_crm(&self, payload: CrmPayload) -> JoinHandle<()> {
        let crm = self.crm.clone();
        tokio::spawn(async move {
            if let Err(e) = crm.notify(&payload).await {
                tracing::warn!(error = %e, "CRM notification failed");
            }
        })
    }
}
