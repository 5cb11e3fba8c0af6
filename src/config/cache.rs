//! Cache configuration

use serde::Deserialize;
use std::time::Duration;

use crate::adapters::cache::CacheSettings;

use super::error::ValidationError;

/// Instant cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Redis URL; the in-memory store is used when unset
    pub redis_url: Option<String>,

    /// Key namespace
    #[serde(default = "default_namespace")]
    pub namespace: String,

    #[serde(default = "default_products_ttl")]
    pub products_ttl_secs: u64,

    /// Age after which a cache hit triggers a background refresh
    #[serde(default = "default_freshness")]
    pub freshness_secs: u64,

    #[serde(default = "default_endpoint_ttl")]
    pub endpoint_ttl_secs: u64,

    #[serde(default = "default_fallback_ttl")]
    pub fallback_ttl_secs: u64,
}

impl CacheConfig {
    pub fn settings(&self) -> CacheSettings {
        CacheSettings {
            namespace: self.namespace.clone(),
            products_ttl: Duration::from_secs(self.products_ttl_secs),
            freshness: Duration::from_secs(self.freshness_secs),
            endpoint_ttl: Duration::from_secs(self.endpoint_ttl_secs),
            fallback_ttl: Duration::from_secs(self.fallback_ttl_secs),
        }
    }

    /// Validate cache configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = &self.redis_url {
            if !url.starts_with("redis://") && !url.starts_with("rediss://") {
                return Err(ValidationError::InvalidRedisUrl);
            }
        }
        if self.namespace.trim().is_empty() {
            return Err(ValidationError::MissingRequired("cache.namespace"));
        }
        for (value, name) in [
            (self.products_ttl_secs, "cache.products_ttl_secs"),
            (self.endpoint_ttl_secs, "cache.endpoint_ttl_secs"),
            (self.fallback_ttl_secs, "cache.fallback_ttl_secs"),
        ] {
            if value == 0 {
                return Err(ValidationError::InvalidTimeout(name));
            }
        }
        if self.freshness_secs >= self.products_ttl_secs {
            return Err(ValidationError::FreshnessExceedsTtl);
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            namespace: default_namespace(),
            products_ttl_secs: default_products_ttl(),
            freshness_secs: default_freshness(),
            endpoint_ttl_secs: default_endpoint_ttl(),
            fallback_ttl_secs: default_fallback_ttl(),
        }
    }
}

fn default_namespace() -> String {
    "rental".to_string()
}

fn default_products_ttl() -> u64 {
    300
}

fn default_freshness() -> u64 {
    120
}

fn default_endpoint_ttl() -> u64 {
    300
}

fn default_fallback_ttl() -> u64 {
    2700
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_cache_settings() {
        assert_eq!(CacheConfig::default().settings(), CacheSettings::default());
    }

    #[test]
    fn test_freshness_must_be_below_ttl() {
        let config = CacheConfig {
            freshness_secs: 300,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::FreshnessExceedsTtl));
    }

    #[test]
    fn test_redis_url_scheme() {
        let config = CacheConfig {
            redis_url: Some("http://localhost:6379".to_string()),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidRedisUrl));
    }
}
