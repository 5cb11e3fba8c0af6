//! Background sync configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Commerce-to-database sync configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Run the periodic sync loop
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Seconds between sync runs
    #[serde(default = "default_interval")]
    pub interval_secs: u64,
}

impl SyncConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Validate sync configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.interval_secs < 60 {
            return Err(ValidationError::InvalidTimeout("sync.interval_secs"));
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_secs: default_interval(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_interval() -> u64 {
    900
}
