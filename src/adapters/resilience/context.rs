//! ResilienceContext - the guarded-call decorator every outbound adapter
//! goes through.
//!
//! A call proceeds only when:
//! 1. the emergency stop is off,
//! 2. the upstream's circuit breaker allows it,
//! 3. the upstream's rate limiter has quota left.
//!
//! The call then runs under a deadline, and its outcome is recorded into the
//! breaker and the connectivity monitor.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::domain::resilience::{ConnectivityMetrics, Dependency, NetworkOrigin, TransportError};
use crate::ports::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerMetrics, CircuitState, Clock,
    RateLimitConfig, RateLimitDenied, RateLimitResult, RateLimitStatus, RateLimiter,
    SystemClock,
};

use super::{ConnectivityMonitor, InMemoryCircuitBreaker, SlidingWindowRateLimiter};

const ALL_DEPENDENCIES: [Dependency; 4] = [
    Dependency::Commerce,
    Dependency::Functions,
    Dependency::Database,
    Dependency::Crm,
];

/// Breaker, limiter and deadline for one upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyPolicy {
    pub breaker: CircuitBreakerConfig,
    pub rate_limit: RateLimitConfig,
    pub timeout: Duration,
}

impl DependencyPolicy {
    /// Defaults tuned per upstream.
    pub fn default_for(dependency: Dependency) -> Self {
        match dependency {
            Dependency::Commerce => Self {
                breaker: CircuitBreakerConfig::for_commerce_api(),
                rate_limit: RateLimitConfig::new(60, Duration::from_secs(60)),
                timeout: Duration::from_secs(15),
            },
            Dependency::Functions => Self {
                breaker: CircuitBreakerConfig::for_functions(),
                rate_limit: RateLimitConfig::new(120, Duration::from_secs(60)),
                timeout: Duration::from_secs(10),
            },
            Dependency::Database => Self {
                breaker: CircuitBreakerConfig::for_database(),
                rate_limit: RateLimitConfig::new(120, Duration::from_secs(60)),
                timeout: Duration::from_secs(10),
            },
            Dependency::Crm => Self {
                breaker: CircuitBreakerConfig::default(),
                rate_limit: RateLimitConfig::new(30, Duration::from_secs(60)),
                timeout: Duration::from_secs(10),
            },
        }
    }
}

struct Guard {
    breaker: Arc<dyn CircuitBreaker>,
    limiter: Arc<dyn RateLimiter>,
    timeout: Duration,
}

/// Point-in-time view of every gate, for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct ResilienceSnapshot {
    pub connectivity: ConnectivityMetrics,
    pub healthy: bool,
    pub breakers: BTreeMap<&'static str, CircuitBreakerMetrics>,
    pub rate_limits: BTreeMap<&'static str, RateLimitStatus>,
}

/// Explicit resilience state injected into every outbound adapter.
pub struct ResilienceContext {
    connectivity: Arc<ConnectivityMonitor>,
    guards: HashMap<Dependency, Guard>,
}

/// Builder for `ResilienceContext`.
pub struct ResilienceContextBuilder {
    clock: Arc<dyn Clock>,
    policies: HashMap<Dependency, DependencyPolicy>,
}

impl ResilienceContextBuilder {
    pub fn policy(mut self, dependency: Dependency, policy: DependencyPolicy) -> Self {
        self.policies.insert(dependency, policy);
        self
    }

    pub fn build(self) -> ResilienceContext {
        let guards = ALL_DEPENDENCIES
            .into_iter()
            .map(|dependency| {
                let policy = self
                    .policies
                    .get(&dependency)
                    .cloned()
                    .unwrap_or_else(|| DependencyPolicy::default_for(dependency));
                let guard = Guard {
                    breaker: Arc::new(InMemoryCircuitBreaker::new(
                        dependency,
                        policy.breaker,
                        self.clock.clone(),
                    )),
                    limiter: Arc::new(SlidingWindowRateLimiter::new(
                        policy.rate_limit,
                        self.clock.clone(),
                    )),
                    timeout: policy.timeout,
                };
                (dependency, guard)
            })
            .collect();

        ResilienceContext {
            connectivity: Arc::new(ConnectivityMonitor::new(self.clock)),
            guards,
        }
    }
}

impl ResilienceContext {
    pub fn builder(clock: Arc<dyn Clock>) -> ResilienceContextBuilder {
        ResilienceContextBuilder {
            clock,
            policies: HashMap::new(),
        }
    }

    /// Default policies on the system clock.
    pub fn with_defaults() -> Self {
        Self::builder(Arc::new(SystemClock)).build()
    }

    pub fn connectivity(&self) -> &ConnectivityMonitor {
        &self.connectivity
    }

    fn guard(&self, dependency: Dependency) -> &Guard {
        // Every dependency gets a guard in `build`.
        &self.guards[&dependency]
    }

    pub fn breaker(&self, dependency: Dependency) -> Arc<dyn CircuitBreaker> {
        self.guard(dependency).breaker.clone()
    }

    pub fn limiter(&self, dependency: Dependency) -> Arc<dyn RateLimiter> {
        self.guard(dependency).limiter.clone()
    }

    pub fn timeout(&self, dependency: Dependency) -> Duration {
        self.guard(dependency).timeout
    }

    pub fn is_open(&self, dependency: Dependency) -> bool {
        self.guard(dependency).breaker.state() == CircuitState::Open
    }

    /// Connectivity is healthy and no emergency stop is active.
    pub fn is_healthy(&self) -> bool {
        self.connectivity.is_healthy()
    }

    /// Runs `call` against `dependency` behind every gate.
    pub async fn execute<T, F, Fut>(&self, dependency: Dependency, call: F) -> Result<T, TransportError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        if self.connectivity.is_emergency_stopped() {
            tracing::debug!(%dependency, "Call blocked by emergency stop");
            return Err(TransportError::EmergencyStop);
        }

        let guard = self.guard(dependency);
        // An exhausted quota refuses before the breaker can move to half-open.
        if guard.limiter.status().remaining == 0 {
            if let RateLimitResult::Denied(denied) = guard.limiter.check() {
                return Err(rate_limited(dependency, denied));
            }
        }
        if !guard.breaker.should_allow() {
            tracing::debug!(%dependency, "Call blocked by open circuit");
            return Err(TransportError::CircuitOpen { dependency });
        }
        if let RateLimitResult::Denied(denied) = guard.limiter.check() {
            return Err(rate_limited(dependency, denied));
        }

        let outcome = match tokio::time::timeout(guard.timeout, call()).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                dependency,
                after: guard.timeout,
            }),
        };
        self.record(dependency, guard, &outcome);
        outcome
    }

    /// Like [`execute`](Self::execute), but hands any failure to `fallback`,
    /// local rejections included.
    ///
    /// The fallback runs outside the gates of `dependency`; a fallback that
    /// calls another upstream goes through `execute` itself.
    pub async fn execute_with_fallback<T, F, Fut, G, GFut>(
        &self,
        dependency: Dependency,
        call: F,
        fallback: G,
    ) -> Result<T, TransportError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
        G: FnOnce(TransportError) -> GFut,
        GFut: Future<Output = Result<T, TransportError>>,
    {
        match self.execute(dependency, call).await {
            Ok(value) => Ok(value),
            Err(error) => {
                tracing::info!(%dependency, error = %error, "Using fallback");
                fallback(error).await
            }
        }
    }

    fn record<T>(&self, dependency: Dependency, guard: &Guard, outcome: &Result<T, TransportError>) {
        let error = match outcome {
            Ok(_) => {
                guard.breaker.record_success();
                self.connectivity.record_success();
                return;
            }
            Err(error) => error,
        };

        if error.counts_against_breaker() {
            guard.breaker.record_failure();
        }

        match error {
            TransportError::Timeout { .. } => self.connectivity.record_timeout(),
            TransportError::Network { origin, .. } => self.connectivity.record_network_error(*origin),
            TransportError::Auth { .. } => self.connectivity.record_auth_error(),
            TransportError::Http { status, .. } if *status >= 500 => {
                self.connectivity.record_network_error(NetworkOrigin::Dependency)
            }
            // The upstream answered: the network itself is fine.
            TransportError::Shape { .. } | TransportError::Http { .. } => {
                self.connectivity.record_success()
            }
            TransportError::CircuitOpen { .. }
            | TransportError::RateLimited { .. }
            | TransportError::EmergencyStop => {}
        }

        tracing::warn!(%dependency, error = %error, "Upstream call failed");
    }

    /// Clears every breaker, every limiter, the emergency stop and the
    /// connectivity counters together.
    pub fn reset_all(&self) {
        for guard in self.guards.values() {
            guard.breaker.reset();
            guard.limiter.reset();
        }
        self.connectivity.reset();
        tracing::info!("Connectivity reset: breakers, limiters and emergency stop cleared");
    }

    pub fn snapshot(&self) -> ResilienceSnapshot {
        let breakers = ALL_DEPENDENCIES
            .iter()
            .map(|dependency| (dependency.as_str(), self.guard(*dependency).breaker.metrics()))
            .collect();
        let rate_limits = ALL_DEPENDENCIES
            .iter()
            .map(|dependency| (dependency.as_str(), self.guard(*dependency).limiter.status()))
            .collect();
        ResilienceSnapshot {
            connectivity: self.connectivity.metrics(),
            healthy: self.is_healthy(),
            breakers,
            rate_limits,
        }
    }
}

fn rate_limited(dependency: Dependency, denied: RateLimitDenied) -> TransportError {
    tracing::warn!(
        %dependency,
        retry_after_ms = denied.retry_after.as_millis() as u64,
        "Rate limit reached"
    );
    TransportError::RateLimited {
        dependency,
        retry_after: denied.retry_after,
    }
}
