//! Redis-backed key-value store for deployments with several instances.
//!
//! Values are written with `SET .. PX` so Redis cleans up expired entries on
//! its own; logical expiry still happens in the instant cache.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use crate::ports::{KeyValueStore, StoreError};

const SCAN_BATCH: usize = 200;

#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    /// Connects to `url`.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url).map_err(unavailable)?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(unavailable)?;
        Ok(Self::new(conn))
    }
}

fn unavailable(e: redis::RedisError) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

fn failed(e: redis::RedisError) -> StoreError {
    StoreError::OperationFailed(e.to_string())
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(failed)
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(ttl) = ttl.filter(|ttl| !ttl.is_zero()) {
            cmd.arg("PX").arg(ttl.as_millis() as u64);
        }
        cmd.query_async::<_, ()>(&mut conn).await.map_err(failed)
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await.map_err(failed)
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        let pattern = format!("{}*", prefix);
        let mut cursor: u64 = 0;
        let mut removed: u64 = 0;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(failed)?;

            if !keys.is_empty() {
                let deleted: u64 = conn.del(&keys).await.map_err(failed)?;
                removed += deleted;
            }
            if next == 0 {
                break;
            }
            cursor = next;
        }

        Ok(removed)
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}
