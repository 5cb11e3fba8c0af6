//! Cache adapters.
//!
//! - `InMemoryStore` - `HashMap` store for tests and single instances
//! - `RedisStore` - Redis store shared between instances
//! - `InstantCache` - Typed, TTL-enveloped product and endpoint cache

mod in_memory;
mod instant_cache;
mod redis;

pub use in_memory::InMemoryStore;
pub use instant_cache::{CacheEntry, CacheSettings, InstantCache};
pub use redis::RedisStore;
