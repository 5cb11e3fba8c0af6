//! Rate limiting port for capping outbound call volume per upstream.
//!
//! Works alongside the circuit breaker: both must permit a call before it
//! is sent.

use serde::Serialize;
use std::time::Duration;

/// Port for outbound rate limiting.
///
/// Implementations must be safe to share between tasks.
pub trait RateLimiter: Send + Sync {
    /// Check if a request is allowed, recording it if so.
    fn check(&self) -> RateLimitResult;

    /// Current status without recording a request.
    fn status(&self) -> RateLimitStatus;

    /// Clear all recorded requests, restoring the full quota.
    fn reset(&self);
}

/// Rate limit configuration for one upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests allowed inside the window.
    pub max_requests: u32,
    /// Sliding window length.
    pub window: Duration,
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 60,
            window: Duration::from_secs(60),
        }
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub enum RateLimitResult {
    /// Request is allowed; includes current status.
    Allowed(RateLimitStatus),
    /// Request is denied; includes denial details.
    Denied(RateLimitDenied),
}

impl RateLimitResult {
    /// Returns true if the request was allowed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed(_))
    }

    /// Returns true if the request was denied.
    pub fn is_denied(&self) -> bool {
        matches!(self, RateLimitResult::Denied(_))
    }
}

/// Current rate limit status.
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitStatus {
    /// Maximum requests allowed in the window.
    pub limit: u32,
    /// Remaining requests in the current window.
    pub remaining: u32,
    /// Window duration.
    pub window: Duration,
}

/// Details of a rate limit denial.
#[derive(Debug, Clone)]
pub struct RateLimitDenied {
    /// Maximum requests allowed in the window.
    pub limit: u32,
    /// Time until the oldest recorded request leaves the window.
    pub retry_after: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_result_is_allowed_works() {
        let status = RateLimitStatus {
            limit: 100,
            remaining: 50,
            window: Duration::from_secs(60),
        };
        let result = RateLimitResult::Allowed(status);
        assert!(result.is_allowed());
        assert!(!result.is_denied());
    }

    #[test]
    fn rate_limit_result_is_denied_works() {
        let result = RateLimitResult::Denied(RateLimitDenied {
            limit: 100,
            retry_after: Duration::from_secs(30),
        });
        assert!(result.is_denied());
        assert!(!result.is_allowed());
    }

    #[test]
    fn default_config_is_sixty_per_minute() {
        let config = RateLimitConfig::default();
        assert_eq!(config.max_requests, 60);
        assert_eq!(config.window, Duration::from_secs(60));
    }
}
