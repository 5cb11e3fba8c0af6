//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `RENTAL` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use rental_booking::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod cache;
mod checkout;
mod commerce;
mod crm;
mod database;
mod error;
mod resilience;
mod server;
mod sync;

pub use cache::CacheConfig;
pub use checkout::CheckoutConfig;
pub use commerce::CommerceConfig;
pub use crm::CrmConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use resilience::{PolicyOverrides, ResilienceConfig};
pub use server::{Environment, ServerConfig};
pub use sync::SyncConfig;

use serde::Deserialize;

use crate::adapters::resilience::DependencyPolicy;
use crate::domain::resilience::Dependency;

/// Root application configuration
///
/// Only the commerce section is required; every other section has defaults.
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// WooCommerce REST API
    pub commerce: CommerceConfig,

    /// Product database transports (function endpoint, direct Postgres)
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Instant cache (Redis or in-memory)
    #[serde(default)]
    pub cache: CacheConfig,

    /// Breaker and rate-limit overrides
    #[serde(default)]
    pub resilience: ResilienceConfig,

    /// Background sync
    #[serde(default)]
    pub sync: SyncConfig,

    /// CRM webhook
    #[serde(default)]
    pub crm: CrmConfig,

    /// Checkout handoff
    #[serde(default)]
    pub checkout: CheckoutConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `RENTAL` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `RENTAL__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `RENTAL__COMMERCE__BASE_URL=...` -> `commerce.base_url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into the expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("RENTAL")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid value found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.commerce.validate(&self.server.environment)?;
        self.database.validate()?;
        self.cache.validate()?;
        self.resilience.validate()?;
        self.sync.validate()?;
        self.crm.validate()?;
        self.checkout.validate()?;
        Ok(())
    }

    /// Effective breaker, limiter and deadline for an upstream.
    pub fn dependency_policy(&self, dependency: Dependency) -> DependencyPolicy {
        let timeout = match dependency {
            Dependency::Commerce => self.commerce.request_timeout(),
            Dependency::Functions | Dependency::Database => self.database.request_timeout(),
            Dependency::Crm => self.crm.request_timeout(),
        };
        self.resilience.policy(dependency, timeout)
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use std::time::Duration;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const OPTIONAL_VARS: [&str; 6] = [
        "RENTAL__SERVER__PORT",
        "RENTAL__SERVER__ENVIRONMENT",
        "RENTAL__DATABASE__URL",
        "RENTAL__CACHE__FRESHNESS_SECS",
        "RENTAL__RESILIENCE__COMMERCE__FAILURE_THRESHOLD",
        "RENTAL__SYNC__ENABLED",
    ];

    fn set_minimal_env() {
        env::set_var("RENTAL__COMMERCE__BASE_URL", "https://shop.example.com");
        env::set_var("RENTAL__COMMERCE__CONSUMER_KEY", "ck_test");
        env::set_var("RENTAL__COMMERCE__CONSUMER_SECRET", "cs_test");
    }

    fn clear_env() {
        env::remove_var("RENTAL__COMMERCE__BASE_URL");
        env::remove_var("RENTAL__COMMERCE__CONSUMER_KEY");
        env::remove_var("RENTAL__COMMERCE__CONSUMER_SECRET");
        for var in OPTIONAL_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.commerce.base_url, "https://shop.example.com");
        assert_eq!(config.commerce.rental_category, "rentals");
        assert!(config.database.url.is_none());
        assert!(config.sync.enabled);
    }

    #[test]
    fn test_missing_commerce_section_fails() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        assert!(AppConfig::load().is_err());
    }

    #[test]
    fn test_validate_minimal_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nested_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("RENTAL__SERVER__PORT", "3000");
        env::set_var("RENTAL__SERVER__ENVIRONMENT", "production");
        env::set_var("RENTAL__DATABASE__URL", "postgres://rental@localhost/rental");
        env::set_var("RENTAL__RESILIENCE__COMMERCE__FAILURE_THRESHOLD", "2");
        env::set_var("RENTAL__SYNC__ENABLED", "false");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.is_production());
        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://rental@localhost/rental")
        );
        assert!(!config.sync.enabled);

        let policy = config.dependency_policy(Dependency::Commerce);
        assert_eq!(policy.breaker.failure_threshold, 2);
        assert_eq!(policy.timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_invalid_cache_window_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("RENTAL__CACHE__FRESHNESS_SECS", "600");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.validate(), Err(ValidationError::FreshnessExceedsTtl));
    }
}
