//! Application layer - orchestrates domain rules over the ports.
//!
//! - `ProductResolver` - Cache-first walk over the product tiers
//! - `SyncService` - Periodic commerce-to-database copy
//! - `SubmitCheckoutHandler` - Pricing, order creation and handoff

mod checkout;
mod product_resolver;
mod sync_service;

pub use checkout::{CheckoutError, CheckoutSettings, SubmitCheckoutHandler, SubmitCheckoutResult};
pub use product_resolver::{ProductResolver, Resolution, ResolutionError, TierAttempt};
pub use sync_service::{SkipReason, SyncConfig, SyncError, SyncOutcome, SyncReport, SyncService};
