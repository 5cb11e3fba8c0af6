//! In-memory key-value store for tests and single-instance deployments.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::ports::{KeyValueStore, StoreError};

/// Key-value store backed by a `HashMap`.
///
/// TTL hints are ignored; the instant cache expires entries logically.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys (test helper).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn contains_key(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String, _ttl: Option<Duration>) -> Result<(), StoreError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<u64, StoreError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok((before - entries.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_overwrites() {
        let store = InMemoryStore::new();
        store.set("k", "a".to_string(), None).await.unwrap();
        store.set("k", "b".to_string(), None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("b".to_string()));
    }

    #[tokio::test]
    async fn delete_missing_key_is_ok() {
        let store = InMemoryStore::new();
        assert!(store.delete("missing").await.is_ok());
    }

    #[tokio::test]
    async fn delete_prefix_removes_only_matching_keys() {
        let store = InMemoryStore::new();
        store.set("rb:endpoint:a", "1".to_string(), None).await.unwrap();
        store.set("rb:endpoint:b", "2".to_string(), None).await.unwrap();
        store.set("rb:products:primary", "3".to_string(), None).await.unwrap();

        let removed = store.delete_prefix("rb:endpoint:").await.unwrap();
        assert_eq!(removed, 2);
        assert!(store.contains_key("rb:products:primary").await);
        assert_eq!(store.len().await, 1);
    }
}
