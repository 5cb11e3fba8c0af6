//! HTTP adapter for checkout.
//!
//! - `POST /api/checkout` - Create an order, or fall back to a checkout URL

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use routes::checkout_routes;
