//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `resilience` - Circuit breakers, rate limiters, connectivity monitor and
//!   the guarded-call context every outbound adapter goes through
//! - `cache` - Instant cache over Redis or an in-memory store
//! - `commerce` - WooCommerce REST client
//! - `database` - Product database over the serverless function or Postgres
//! - `sources` - Product tiers for the resolver
//! - `crm` - CRM automation webhook
//! - `http` - Axum REST API

pub mod cache;
pub mod commerce;
pub mod crm;
pub mod database;
pub mod http;
pub mod resilience;
pub mod sources;
