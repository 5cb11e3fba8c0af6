//! CRM webhook configuration

use secrecy::SecretString;
use serde::Deserialize;
use std::time::Duration;

use super::commerce::is_http_url;
use super::error::ValidationError;

/// CRM automation webhook. Notifications are dropped when no URL is set.
#[derive(Debug, Clone, Deserialize)]
pub struct CrmConfig {
    pub webhook_url: Option<String>,

    /// HMAC-SHA256 key for the signature header
    pub signing_secret: Option<SecretString>,

    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

impl CrmConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate CRM configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = &self.webhook_url {
            if !is_http_url(url) {
                return Err(ValidationError::InvalidUrl("crm.webhook_url"));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("crm.request_timeout_secs"));
        }
        Ok(())
    }
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            signing_secret: None,
            request_timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_webhook_is_valid() {
        assert!(CrmConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_webhook_url() {
        let config = CrmConfig {
            webhook_url: Some("hooks.example.com/crm".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidUrl("crm.webhook_url"))
        );
    }
}
