//! In-process circuit breaker.
//!
//! One instance per upstream; instances never share state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::domain::foundation::Timestamp;
use crate::domain::resilience::Dependency;
use crate::ports::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerMetrics, CircuitState, Clock};

#[derive(Debug, Default)]
struct BreakerState {
    state: CircuitState,
    failures: u32,
    successes: u32,
    last_failure: Option<Timestamp>,
    next_attempt: Option<Timestamp>,
    total_successes: u64,
    total_failures: u64,
    times_opened: u64,
}

/// Circuit breaker holding its state in memory, timed by an injected clock.
pub struct InMemoryCircuitBreaker {
    dependency: Dependency,
    config: CircuitBreakerConfig,
    clock: Arc<dyn Clock>,
    inner: Mutex<BreakerState>,
}

impl InMemoryCircuitBreaker {
    pub fn new(dependency: Dependency, config: CircuitBreakerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            dependency,
            config,
            clock,
            inner: Mutex::new(BreakerState::default()),
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open(&self, inner: &mut BreakerState, now: Timestamp) {
        inner.state = CircuitState::Open;
        inner.successes = 0;
        inner.next_attempt = Some(now.plus(self.config.recovery_timeout));
        inner.times_opened += 1;
        tracing::warn!(
            dependency = %self.dependency,
            failures = inner.failures,
            retry_in_secs = self.config.recovery_timeout.as_secs(),
            "Circuit opened"
        );
    }
}

impl CircuitBreaker for InMemoryCircuitBreaker {
    fn state(&self) -> CircuitState {
        self.lock().state
    }

    fn should_allow(&self) -> bool {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let now = self.clock.now();
                let due = inner.next_attempt.map_or(true, |next| !now.is_before(&next));
                if due {
                    inner.state = CircuitState::HalfOpen;
                    inner.successes = 0;
                    tracing::info!(dependency = %self.dependency, "Circuit half-open, probing");
                }
                due
            }
        }
    }

    fn record_success(&self) {
        let mut inner = self.lock();
        inner.total_successes += 1;
        match inner.state {
            CircuitState::Closed => inner.failures = 0,
            CircuitState::HalfOpen => {
                inner.successes += 1;
                if inner.successes >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.failures = 0;
                    inner.successes = 0;
                    inner.next_attempt = None;
                    tracing::info!(dependency = %self.dependency, "Circuit closed");
                }
            }
            // Recovery only goes through half-open.
            CircuitState::Open => {
                tracing::debug!(dependency = %self.dependency, "Ignoring success while open");
            }
        }
    }

    fn record_failure(&self) {
        let now = self.clock.now();
        let mut inner = self.lock();
        inner.total_failures += 1;
        inner.failures += 1;
        inner.last_failure = Some(now);
        match inner.state {
            CircuitState::Closed if inner.failures >= self.config.failure_threshold => {
                self.open(&mut inner, now)
            }
            CircuitState::HalfOpen => self.open(&mut inner, now),
            _ => {}
        }
    }

    fn reset(&self) {
        let mut inner = self.lock();
        inner.state = CircuitState::Closed;
        inner.failures = 0;
        inner.successes = 0;
        inner.last_failure = None;
        inner.next_attempt = None;
    }

    fn metrics(&self) -> CircuitBreakerMetrics {
        let inner = self.lock();
        let state = inner.state;
        let time_until_half_open = match (state, inner.next_attempt) {
            (CircuitState::Open, Some(next)) => Some(next.elapsed_since(&self.clock.now())),
            _ => None,
        };
        CircuitBreakerMetrics {
            state: Some(state),
            total_successes: inner.total_successes,
            total_failures: inner.total_failures,
            times_opened: inner.times_opened,
            current_failures: inner.failures,
            current_successes: inner.successes,
            time_until_half_open: time_until_half_open.filter(|d| *d > Duration::ZERO),
        }
    }
}
