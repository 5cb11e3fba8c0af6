//! CircuitBreaker port - Interface for upstream resilience.
//!
//! The circuit breaker stops calling a failing upstream (commerce API,
//! serverless functions, the direct database connection) for a cooldown
//! period, then probes recovery.
//!
//! ## States
//!
//! - **Closed**: Normal operation, requests flow through
//! - **Open**: Too many failures, requests rejected immediately
//! - **Half-Open**: Probing recovery, requests allowed while successes accumulate
//!
//! ## Transitions
//!
//! ```text
//! Closed --[failure_threshold reached]--> Open
//! Open --[now >= next_attempt]--> Half-Open
//! Half-Open --[success_threshold consecutive successes]--> Closed
//! Half-Open --[any failure]--> Open
//! ```
//!
//! Every recovery goes through Half-Open; a success observed while Open never
//! closes the circuit directly.

use serde::Serialize;
use std::time::Duration;

/// Circuit breaker states for upstream protection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    /// Normal operation - requests flow through to the service.
    #[default]
    Closed,

    /// Too many failures - requests rejected until the recovery timeout elapses.
    Open,

    /// Probing recovery - requests allowed, successes counted.
    HalfOpen,
}

impl CircuitState {
    /// Check if the circuit allows requests through without a time check.
    pub fn allows_requests(&self) -> bool {
        matches!(self, CircuitState::Closed | CircuitState::HalfOpen)
    }
}

/// Configuration for circuit breaker behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Number of failures before opening circuit.
    ///
    /// Default: 5 failures
    pub failure_threshold: u32,

    /// Time to wait before probing recovery (moving to half-open).
    ///
    /// Default: 60 seconds
    pub recovery_timeout: Duration,

    /// Number of consecutive half-open successes needed to close the circuit.
    ///
    /// Default: 2 successes
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(60),
            success_threshold: 2,
        }
    }
}

impl CircuitBreakerConfig {
    /// Config for the commerce REST API.
    pub fn for_commerce_api() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(60),
            success_threshold: 3,
        }
    }

    /// Config for serverless function calls (fail fast, recover quickly).
    pub fn for_functions() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }

    /// Config for the direct database connection.
    pub fn for_database() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(45),
            success_threshold: 2,
        }
    }
}

/// Port for circuit breaker functionality.
///
/// # Example
///
/// ```ignore
/// if !breaker.should_allow() {
///     return Err(TransportError::CircuitOpen { dependency });
/// }
/// match call().await {
///     Ok(v) => { breaker.record_success(); Ok(v) }
///     Err(e) => { breaker.record_failure(); Err(e) }
/// }
/// ```
pub trait CircuitBreaker: Send + Sync {
    /// Get the current state of the circuit.
    fn state(&self) -> CircuitState;

    /// Check if a request should be allowed through.
    ///
    /// While open, the first call at or after `next_attempt` moves the circuit
    /// to half-open and is allowed through as the probe.
    fn should_allow(&self) -> bool;

    /// Record a successful request.
    fn record_success(&self);

    /// Record a failed request.
    fn record_failure(&self);

    /// Force reset the circuit to closed state.
    fn reset(&self);

    /// Get metrics about the circuit breaker.
    fn metrics(&self) -> CircuitBreakerMetrics;
}

/// Metrics about circuit breaker behavior.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CircuitBreakerMetrics {
    /// Current state
    pub state: Option<CircuitState>,

    /// Total successful requests since creation
    pub total_successes: u64,

    /// Total failed requests since creation
    pub total_failures: u64,

    /// Times the circuit has opened
    pub times_opened: u64,

    /// Current failure count
    pub current_failures: u32,

    /// Current success count (in half-open state)
    pub current_successes: u32,

    /// Time until circuit transitions to half-open (when open)
    pub time_until_half_open: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn circuit_state_allows_requests() {
        assert!(CircuitState::Closed.allows_requests());
        assert!(CircuitState::HalfOpen.allows_requests());
        assert!(!CircuitState::Open.allows_requests());
    }

    #[test]
    fn default_config_values() {
        let config = CircuitBreakerConfig::default();
        assert_eq!(config.failure_threshold, 5);
        assert_eq!(config.recovery_timeout, Duration::from_secs(60));
        assert_eq!(config.success_threshold, 2);
    }

    #[test]
    fn functions_config_fails_faster_than_commerce() {
        let functions = CircuitBreakerConfig::for_functions();
        let commerce = CircuitBreakerConfig::for_commerce_api();
        assert!(functions.failure_threshold < commerce.failure_threshold);
        assert!(functions.recovery_timeout < commerce.recovery_timeout);
    }

    #[test]
    fn state_serializes_in_upper_case() {
        let json = serde_json::to_string(&CircuitState::HalfOpen).unwrap();
        assert_eq!(json, "\"HALF_OPEN\"");
    }
}
