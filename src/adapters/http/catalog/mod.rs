//! HTTP adapter for catalogue endpoints.
//!
//! - `GET /api/products` - Resolved product list
//! - `GET /api/products/:id` - One bike
//! - `GET /api/products/:id/variations` - Sizes of one bike
//! - `POST /api/pricing/validate` - Authoritative pricing preview

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::*;
pub use routes::catalog_routes;
