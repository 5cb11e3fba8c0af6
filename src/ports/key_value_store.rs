//! Key-value store port backing the instant cache.
//!
//! Values are opaque strings; the typed envelope (payload, creation time, TTL)
//! lives one layer up in `InstantCache`, so any store that can hold strings can
//! back it.

use async_trait::async_trait;
use std::time::Duration;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store operation failed: {0}")]
    OperationFailed(String),
}

/// Port for a string key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, always overwriting.
    ///
    /// `ttl` is a hint for physical cleanup; logical expiry is decided by the
    /// reader.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>)
        -> Result<(), StoreError>;

    /// Remove a key. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Remove every key starting with `prefix`, returning how many were removed.
    async fn delete_prefix(&self, prefix: &str) -> Result<u64, StoreError>;
}
