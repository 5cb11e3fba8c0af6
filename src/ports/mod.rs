//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Upstream Ports
//!
//! - `CommerceApi` - Product catalogue and order creation
//! - `ProductDatabase` - Secondary product store kept warm by sync
//! - `CrmNotifier` - Reservation webhook
//!
//! ## Resilience Ports
//!
//! - `CircuitBreaker` - Per-upstream failure gate
//! - `RateLimiter` - Per-upstream call volume cap
//! - `Clock` - Injectable time source
//!
//! ## Resolution Ports
//!
//! - `ProductSource` - One tier of the product resolution chain
//! - `KeyValueStore` - Backing store for the instant cache

mod circuit_breaker;
mod clock;
mod commerce_api;
mod crm_notifier;
mod key_value_store;
mod product_database;
mod product_source;
mod rate_limiter;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerMetrics, CircuitState};
pub use clock::{Clock, ManualClock, SystemClock};
pub use commerce_api::{CommerceApi, ProductQuery, MAX_PRODUCT_PAGES};
pub use crm_notifier::CrmNotifier;
pub use key_value_store::{KeyValueStore, StoreError};
pub use product_database::ProductDatabase;
pub use product_source::{ProductOrigin, ProductSource, SourceError};
pub use rate_limiter::{RateLimitConfig, RateLimitDenied, RateLimitResult, RateLimitStatus, RateLimiter};
