//! Per-upstream breaker and rate-limit overrides

use serde::Deserialize;
use std::time::Duration;

use crate::adapters::resilience::DependencyPolicy;
use crate::domain::resilience::Dependency;
use crate::ports::RateLimitConfig;

use super::error::ValidationError;

/// Optional tuning for one upstream; unset fields keep the built-in default.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyOverrides {
    pub failure_threshold: Option<u32>,
    pub recovery_timeout_secs: Option<u64>,
    pub success_threshold: Option<u32>,
    pub requests_per_minute: Option<u32>,
}

impl PolicyOverrides {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.failure_threshold == Some(0) {
            return Err(ValidationError::InvalidThreshold("failure_threshold"));
        }
        if self.success_threshold == Some(0) {
            return Err(ValidationError::InvalidThreshold("success_threshold"));
        }
        if self.recovery_timeout_secs == Some(0) {
            return Err(ValidationError::InvalidTimeout("recovery_timeout_secs"));
        }
        if self.requests_per_minute == Some(0) {
            return Err(ValidationError::InvalidRateLimit("requests_per_minute"));
        }
        Ok(())
    }

    fn apply(&self, mut policy: DependencyPolicy) -> DependencyPolicy {
        if let Some(threshold) = self.failure_threshold {
            policy.breaker.failure_threshold = threshold;
        }
        if let Some(secs) = self.recovery_timeout_secs {
            policy.breaker.recovery_timeout = Duration::from_secs(secs);
        }
        if let Some(threshold) = self.success_threshold {
            policy.breaker.success_threshold = threshold;
        }
        if let Some(limit) = self.requests_per_minute {
            policy.rate_limit = RateLimitConfig::new(limit, Duration::from_secs(60));
        }
        policy
    }
}

/// Resilience configuration, one section per upstream.
///
/// `RENTAL__RESILIENCE__COMMERCE__FAILURE_THRESHOLD=3` tightens the commerce
/// breaker without touching anything else.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResilienceConfig {
    #[serde(default)]
    pub commerce: PolicyOverrides,
    #[serde(default)]
    pub functions: PolicyOverrides,
    #[serde(default)]
    pub database: PolicyOverrides,
    #[serde(default)]
    pub crm: PolicyOverrides,
}

impl ResilienceConfig {
    fn overrides(&self, dependency: Dependency) -> &PolicyOverrides {
        match dependency {
            Dependency::Commerce => &self.commerce,
            Dependency::Functions => &self.functions,
            Dependency::Database => &self.database,
            Dependency::Crm => &self.crm,
        }
    }

    /// Effective policy for an upstream, with the request deadline supplied
    /// by that upstream's own config section.
    pub fn policy(&self, dependency: Dependency, timeout: Duration) -> DependencyPolicy {
        let mut policy = self
            .overrides(dependency)
            .apply(DependencyPolicy::default_for(dependency));
        policy.timeout = timeout;
        policy
    }

    /// Validate resilience configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.commerce.validate()?;
        self.functions.validate()?;
        self.database.validate()?;
        self.crm.validate()?;
        Ok(())
    }
}
