//! Product database configuration

use serde::Deserialize;
use std::time::Duration;

use super::commerce::is_http_url;
use super::error::ValidationError;

/// Product database configuration.
///
/// Both transports are optional; the resolution chain simply has fewer
/// tiers when one is missing.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL for the direct transport
    pub url: Option<String>,

    /// Serverless function endpoint for the function transport
    pub function_url: Option<String>,

    /// Maximum pool connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl DatabaseConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate database configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = &self.url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(ValidationError::InvalidDatabaseUrl);
            }
        }
        if let Some(url) = &self.function_url {
            if !is_http_url(url) {
                return Err(ValidationError::InvalidUrl("database.function_url"));
            }
        }
        if self.max_connections == 0 || self.max_connections > 100 {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.request_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("database.request_timeout_secs"));
        }
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            function_url: None,
            max_connections: default_max_connections(),
            request_timeout_secs: default_timeout(),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_timeout() -> u64 {
    10
}
