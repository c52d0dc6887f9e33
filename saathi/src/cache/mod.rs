//! Caching for external lookups.
//!
//! Weather, news, and market-price providers rate-limit aggressively and their data
//! moves slowly, so responses are cached under a TTL chosen per endpoint. The trait
//! is generic so handlers can cache whatever DTO they serve.

mod error;
mod in_memory;

pub use error::CacheError;
pub use in_memory::InMemoryCache;

use async_trait::async_trait;
use std::time::Duration;

/// Key-value cache with optional per-entry TTL.
#[async_trait]
pub trait Cache<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Clone + Send + Sync,
{
    /// Returns the cached value, or `None` if absent or expired.
    async fn get(&self, key: &K) -> Option<V>;

    /// Stores a value. `None` TTL means the entry never expires.
    async fn set(&self, key: K, value: V, ttl: Option<Duration>) -> Result<(), CacheError>;

    async fn delete(&self, key: &K) -> Result<(), CacheError>;

    async fn clear(&self) -> Result<(), CacheError>;
}
