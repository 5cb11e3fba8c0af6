//! Commerce backend configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// WooCommerce REST API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CommerceConfig {
    /// Store base URL, e.g. `https://shop.example.com`
    pub base_url: String,

    /// REST consumer key (ck_...)
    pub consumer_key: SecretString,

    /// REST consumer secret (cs_...)
    pub consumer_secret: SecretString,

    /// Category slug holding every rental product
    #[serde(default = "default_category")]
    pub rental_category: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    /// Products per page, 1..=100
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl CommerceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate commerce configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.base_url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("commerce.base_url"));
        }
        if !is_http_url(&self.base_url) {
            return Err(ValidationError::InvalidUrl("commerce.base_url"));
        }
        if *environment == Environment::Production && !self.base_url.starts_with("https://") {
            return Err(ValidationError::CommerceMustBeHttps);
        }
        if self.consumer_key.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingRequired("commerce.consumer_key"));
        }
        if self.consumer_secret.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingRequired("commerce.consumer_secret"));
        }
        if self.rental_category.trim().is_empty() {
            return Err(ValidationError::MissingRequired("commerce.rental_category"));
        }
        if self.request_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("commerce.request_timeout_secs"));
        }
        if !(1..=100).contains(&self.page_size) {
            return Err(ValidationError::InvalidPageSize);
        }
        Ok(())
    }
}

pub(super) fn is_http_url(url: &str) -> bool {
    match reqwest::Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.host().is_some(),
        Err(_) => false,
    }
}

fn default_category() -> String {
    "rentals".to_string()
}

fn default_timeout() -> u64 {
    15
}

fn default_page_size() -> u32 {
    100
}
