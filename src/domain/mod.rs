//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (timestamps, money, errors)
//! - `resilience` - Upstream identifiers, transport errors, connectivity tally
//! - `catalog` - Commerce records, normalized bikes, static fallback catalogue
//! - `pricing` - Tiered pricing tables and the pricing engine
//! - `checkout` - Reservations, order payloads and checkout handoff

pub mod catalog;
pub mod checkout;
pub mod foundation;
pub mod pricing;
pub mod resilience;
