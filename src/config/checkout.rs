//! Checkout configuration

use serde::Deserialize;

use crate::application::CheckoutSettings;

use super::commerce::is_http_url;
use super::error::ValidationError;

/// Checkout configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutConfig {
    /// Public storefront URL used for payment and fallback checkout links.
    /// Defaults to the commerce base URL.
    pub site_url: Option<String>,

    /// ISO 4217 currency code for created orders
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl CheckoutConfig {
    pub fn settings(&self, commerce_base_url: &str) -> CheckoutSettings {
        CheckoutSettings {
            site_url: self
                .site_url
                .clone()
                .unwrap_or_else(|| commerce_base_url.to_string()),
            currency: self.currency.clone(),
        }
    }

    /// Validate checkout configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = &self.site_url {
            if !is_http_url(url) {
                return Err(ValidationError::InvalidUrl("checkout.site_url"));
            }
        }
        if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidCurrency);
        }
        Ok(())
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            site_url: None,
            currency: default_currency(),
        }
    }
}

fn default_currency() -> String {
    "EUR".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_url_defaults_to_commerce_base() {
        let settings = CheckoutConfig::default().settings("https://shop.example.com");
        assert_eq!(settings.site_url, "https://shop.example.com");
        assert_eq!(settings.currency, "EUR");
    }

    #[test]
    fn test_currency_must_be_iso_code() {
        for currency in ["eur", "EURO", "E1R"] {
            let config = CheckoutConfig {
                currency: currency.to_string(),
                ..Default::default()
            };
            assert_eq!(config.validate(), Err(ValidationError::InvalidCurrency));
        }
    }
}
