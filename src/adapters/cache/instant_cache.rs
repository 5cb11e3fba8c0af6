//! InstantCache - layered TTL cache in front of the product sources.
//!
//! Three tiers share one key-value store:
//!
//! | Tier | Key | Default TTL |
//! |------|-----|-------------|
//! | Primary product list | `{ns}:products:primary` | 5 min |
//! | Per-endpoint responses | `{ns}:endpoint:{name}` | 5 min |
//! | Fallback snapshot | `{ns}:products:fallback` | 45 min |
//!
//! Entries carry their own creation time and TTL. Expired or undecodable
//! entries read as absent and are deleted on the spot. Store failures are
//! logged and treated as misses; the cache never fails a request.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::catalog::Bike;
use crate::domain::foundation::Timestamp;
use crate::ports::{Clock, KeyValueStore};

/// Stored envelope around a cached payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub payload: T,
    pub created_at: Timestamp,
    pub ttl_ms: u64,
}

impl<T> CacheEntry<T> {
    pub fn new(payload: T, created_at: Timestamp, ttl: Duration) -> Self {
        Self {
            payload,
            created_at,
            ttl_ms: ttl.as_millis() as u64,
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    pub fn age(&self, now: Timestamp) -> Duration {
        now.elapsed_since(&self.created_at)
    }

    /// Valid while `now - created_at < ttl`.
    pub fn is_valid(&self, now: Timestamp) -> bool {
        self.age(now) < self.ttl()
    }
}

/// Key namespace and TTLs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    pub namespace: String,
    pub products_ttl: Duration,
    /// Age past which a cache hit also triggers a background refresh.
    pub freshness: Duration,
    pub endpoint_ttl: Duration,
    pub fallback_ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            namespace: "rental".to_string(),
            products_ttl: Duration::from_secs(300),
            freshness: Duration::from_secs(120),
            endpoint_ttl: Duration::from_secs(300),
            fallback_ttl: Duration::from_secs(2700),
        }
    }
}

pub struct InstantCache {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    settings: CacheSettings,
}

impl InstantCache {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, settings: CacheSettings) -> Self {
        Self {
            store,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    fn primary_key(&self) -> String {
        format!("{}:products:primary", self.settings.namespace)
    }

    fn fallback_key(&self) -> String {
        format!("{}:products:fallback", self.settings.namespace)
    }

    fn endpoint_prefix(&self) -> String {
        format!("{}:endpoint:", self.settings.namespace)
    }

    fn endpoint_key(&self, endpoint: &str) -> String {
        format!("{}{}", self.endpoint_prefix(), endpoint)
    }

    /// Reads a live entry; expired entries are evicted and read as `None`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        let raw = match self.store.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache read failed");
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding undecodable cache entry");
                self.evict(key).await;
                return None;
            }
        };

        if entry.is_valid(self.clock.now()) {
            Some(entry)
        } else {
            self.evict(key).await;
            None
        }
    }

    /// Writes an entry, always overwriting.
    pub async fn set<T: Serialize>(&self, key: &str, payload: &T, ttl: Duration) {
        let entry = CacheEntry::new(payload, self.clock.now(), ttl);
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key, error = %e, "Cache entry could not be encoded");
                return;
            }
        };
        if let Err(e) = self.store.set(key, raw, Some(ttl)).await {
            tracing::warn!(key, error = %e, "Cache write failed");
        }
    }

    pub async fn delete(&self, key: &str) {
        self.evict(key).await;
    }

    async fn evict(&self, key: &str) {
        if let Err(e) = self.store.delete(key).await {
            tracing::warn!(key, error = %e, "Cache eviction failed");
        }
    }

    // ─── Product tiers ───────────────────────────────────────────────

    /// Primary product list, if present and unexpired.
    pub async fn products(&self) -> Option<CacheEntry<Vec<Bike>>> {
        self.get(&self.primary_key()).await
    }

    /// Long-lived snapshot for when every live source fails.
    pub async fn fallback_products(&self) -> Option<CacheEntry<Vec<Bike>>> {
        self.get(&self.fallback_key()).await
    }

    /// Writes a freshly resolved list into both product tiers.
    pub async fn store_products(&self, bikes: &[Bike]) {
        self.set(&self.primary_key(), &bikes, self.settings.products_ttl)
            .await;
        self.set(&self.fallback_key(), &bikes, self.settings.fallback_ttl)
            .await;
    }

    /// Drops the primary list and endpoint responses. The fallback snapshot
    /// survives so an outage right after a sync still has data.
    pub async fn invalidate_products(&self) {
        self.evict(&self.primary_key()).await;
        match self.store.delete_prefix(&self.endpoint_prefix()).await {
            Ok(removed) => tracing::debug!(removed, "Endpoint cache cleared"),
            Err(e) => tracing::warn!(error = %e, "Endpoint cache clear failed"),
        }
    }

    /// The entry is old enough to warrant a background refresh.
    pub fn is_stale<T>(&self, entry: &CacheEntry<T>) -> bool {
        entry.age(self.clock.now()) >= self.settings.freshness
    }

    // ─── Endpoint tier ───────────────────────────────────────────────

    pub async fn endpoint<T: DeserializeOwned>(&self, endpoint: &str) -> Option<T> {
        self.get(&self.endpoint_key(endpoint))
            .await
            .map(|entry| entry.payload)
    }

    pub async fn store_endpoint<T: Serialize>(&self, endpoint: &str, payload: &T) {
        self.set(&self.endpoint_key(endpoint), payload, self.settings.endpoint_ttl)
            .await;
    }

    /// Removes every tier, fallback included.
    pub async fn clear(&self) {
        let prefix = format!("{}:", self.settings.namespace);
        if let Err(e) = self.store.delete_prefix(&prefix).await {
            tracing::warn!(error = %e, "Cache clear failed");
        }
    }
}
