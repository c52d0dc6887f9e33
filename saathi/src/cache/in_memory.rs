//! In-process cache backed by a `HashMap`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::{Cache, CacheError};

struct Entry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }
}

/// Simple in-memory [`Cache`]. Expired entries are dropped lazily on read; there is
/// no background sweeper, so a never-read expired entry holds its memory until the
/// next write to the same key or a `clear`.
///
/// A poisoned lock makes reads miss and writes fail with [`CacheError::Poisoned`];
/// the cache never panics in the caller.
pub struct InMemoryCache<K, V> {
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K, V> InMemoryCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    fn poison(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = self.entries.lock().expect("not yet poisoned");
            panic!("poisoning cache lock for test");
        }));
    }
}

impl<K, V> Default for InMemoryCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for InMemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    async fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                None
            }
            Some(entry) => Some(entry.value.clone()),
            None => None,
        }
    }

    async fn set(&self, key: K, value: V, ttl: Option<Duration>) -> Result<(), CacheError> {
        let entry = Entry {
            value,
            expires_at: ttl.map(|d| Instant::now() + d),
        };
        self.entries
            .lock()
            .map_err(|_| CacheError::Poisoned)?
            .insert(key, entry);
        Ok(())
    }

    async fn delete(&self, key: &K) -> Result<(), CacheError> {
        self.entries
            .lock()
            .map_err(|_| CacheError::Poisoned)?
            .remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.entries.lock().map_err(|_| CacheError::Poisoned)?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_delete() {
        let cache = InMemoryCache::new();
        cache.set("k", 1u32, None).await.unwrap();
        assert_eq!(cache.get(&"k").await, Some(1));
        cache.delete(&"k").await.unwrap();
        assert_eq!(cache.get(&"k").await, None);
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let cache = InMemoryCache::new();
        cache
            .set("k", 1u32, Some(Duration::from_millis(10)))
            .await
            .unwrap();
        assert_eq!(cache.get(&"k").await, Some(1));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get(&"k").await, None);
    }

    #[tokio::test]
    async fn overwrite_resets_ttl() {
        let cache = InMemoryCache::new();
        cache
            .set("k", 1u32, Some(Duration::from_millis(10)))
            .await
            .unwrap();
        cache.set("k", 2u32, None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.get(&"k").await, Some(2));
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let cache = InMemoryCache::new();
        cache.set("a", 1u32, None).await.unwrap();
        cache.set("b", 2u32, None).await.unwrap();
        cache.clear().await.unwrap();
        assert_eq!(cache.get(&"a").await, None);
        assert_eq!(cache.get(&"b").await, None);
    }

    #[tokio::test]
    async fn poisoned_lock_fails_writes_and_misses_reads() {
        let cache = InMemoryCache::new();
        cache.set("k", 1u32, None).await.unwrap();
        cache.poison();

        let err = cache.set("k", 2u32, None).await.unwrap_err();
        assert!(matches!(err, CacheError::Poisoned));
        assert!(matches!(
            cache.delete(&"k").await.unwrap_err(),
            CacheError::Poisoned
        ));
        assert!(matches!(
            cache.clear().await.unwrap_err(),
            CacheError::Poisoned
        ));
        assert_eq!(cache.get(&"k").await, None);
    }
}
