//! HTTP listener and logging configuration

use serde::Deserialize;
use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

use super::error::ValidationError;

/// Listener, deadline and logging settings for the API binary.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub environment: Environment,

    /// Filter directive, used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub log_json: bool,

    /// Deadline for a whole API request, upstream calls included
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Booking widget origins, comma-separated; unset or `*` allows any
    pub cors_origins: Option<String>,
}

/// Deployment environment
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Explicit origins for CORS. Empty means any origin.
    pub fn allowed_origins(&self) -> Vec<String> {
        let origins: Vec<String> = self
            .cors_origins
            .iter()
            .flat_map(|raw| raw.split(','))
            .map(|origin| origin.trim().trim_end_matches('/').to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        if origins.iter().any(|origin| origin == "*") {
            Vec::new()
        } else {
            origins
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        if self.socket_addr().is_err() {
            return Err(ValidationError::InvalidHost);
        }
        if !(1..=300).contains(&self.request_timeout_secs) {
            return Err(ValidationError::InvalidTimeout("server.request_timeout_secs"));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: Environment::default(),
            log_level: default_log_level(),
            log_json: false,
            request_timeout_secs: default_request_timeout(),
            cors_origins: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info,rental_booking=debug,sqlx=warn".to_string()
}

fn default_request_timeout() -> u64 {
    30
}
