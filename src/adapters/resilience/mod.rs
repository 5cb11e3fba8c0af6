//! Resilience adapters.
//!
//! ## Available Adapters
//!
//! - `InMemoryCircuitBreaker` - Per-upstream circuit breaker
//! - `SlidingWindowRateLimiter` - Per-upstream call volume cap
//! - `ConnectivityMonitor` - Process-wide outcome tally and emergency stop
//! - `ResilienceContext` - Guarded-call decorator combining all of the above
//!
//! ## Usage
//!
//! ```ignore
//! let resilience = Arc::new(ResilienceContext::with_defaults());
//!
//! let products = resilience
//!     .execute(Dependency::Commerce, || async { fetch().await })
//!     .await?;
//! ```

mod circuit_breaker;
mod connectivity_monitor;
mod context;
mod rate_limiter;
mod transport;

pub use circuit_breaker::InMemoryCircuitBreaker;
pub use connectivity_monitor::ConnectivityMonitor;
pub use context::{DependencyPolicy, ResilienceContext, ResilienceContextBuilder, ResilienceSnapshot};
pub use rate_limiter::SlidingWindowRateLimiter;
pub use transport::{classify_reqwest_error, classify_status, decode_json, ensure_success, parse_json};
