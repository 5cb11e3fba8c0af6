//! HTTP adapter for operational endpoints.
//!
//! - `POST /api/sync` - Manual product sync
//! - `GET /api/connectivity` - Resilience snapshot
//! - `POST /api/connectivity/reset` - Reset breakers, limiters and counters

pub mod handlers;
pub mod routes;

pub use routes::operations_routes;
