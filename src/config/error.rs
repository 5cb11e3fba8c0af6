//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind host")]
    InvalidHost,

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(&'static str),

    #[error("Invalid URL for {0}: must be http(s)")]
    InvalidUrl(&'static str),

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Pool size must be between 1 and 100")]
    InvalidPoolSize,

    #[error("Page size must be between 1 and 100")]
    InvalidPageSize,

    #[error("Invalid threshold: {0}")]
    InvalidThreshold(&'static str),

    #[error("Invalid rate limit: {0}")]
    InvalidRateLimit(&'static str),

    #[error("Cache freshness must be shorter than the product TTL")]
    FreshnessExceedsTtl,

    #[error("Commerce base URL must use HTTPS in production")]
    CommerceMustBeHttps,

    #[error("Invalid currency code")]
    InvalidCurrency,
}
