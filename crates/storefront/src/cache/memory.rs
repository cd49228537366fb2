//! In-process cache with LRU eviction and lazy TTL expiry.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::RwLock;

use storefront_core::cache::{pattern_matches, Cache, Result};

/// A stored value with an optional expiry instant.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|d| Instant::now() + d),
        }
    }

    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| Instant::now() > exp)
    }
}

/// In-process cache backend.
///
/// Thread-safe via `Arc<RwLock<LruCache>>`. Expired entries are dropped on
/// access rather than by a sweeper task; TTL only has to be a safety net
/// here, since explicit invalidation keeps entries correct.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<RwLock<LruCache<String, CacheEntry>>>,
}

impl MemoryCache {
    /// Creates a cache bounded to `max_entries` values.
    ///
    /// # Panics
    ///
    /// Panics if `max_entries` is 0.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).expect("max_entries must be > 0");
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
        }
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut store = self.store.write().await;
        match store.get(key) {
            Some(entry) if entry.is_expired() => {
                store.pop(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut store = self.store.write().await;
        store.put(key.to_string(), CacheEntry::new(value.to_vec(), ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut store = self.store.write().await;
        store.pop(key);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut store = self.store.write().await;
        store.clear();
        Ok(())
    }

    async fn list_keys(&self, pattern: &str) -> Result<Vec<String>> {
        let store = self.store.read().await;
        Ok(store
            .iter()
            .filter(|(key, entry)| !entry.is_expired() && pattern_matches(pattern, key))
            .map(|(key, _)| key.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MAX_ENTRIES: usize = 1000;

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("test:key", b"test value", None).await.unwrap();
        let result = cache.get("test:key").await.unwrap();

        assert_eq!(result, Some(b"test value".to_vec()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        assert_eq!(cache.get("nonexistent:key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("test:delete", b"to be deleted", None).await.unwrap();
        assert!(cache.get("test:delete").await.unwrap().is_some());

        cache.delete("test:delete").await.unwrap();
        assert!(cache.get("test:delete").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_absent_key_is_ok() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);
        cache.delete("never:set").await.unwrap();
    }

    #[tokio::test]
    async fn test_ttl_expiration() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache
            .set("test:ttl", b"short-lived", Some(Duration::from_millis(50)))
            .await
            .unwrap();
        assert!(cache.get("test:ttl").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(cache.get("test:ttl").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_no_ttl_never_expires() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("test:no-ttl", b"persistent", None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(cache.get("test:no-ttl").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_overwrite_value() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("test:overwrite", b"first", None).await.unwrap();
        cache.set("test:overwrite", b"second", None).await.unwrap();

        assert_eq!(
            cache.get("test:overwrite").await.unwrap(),
            Some(b"second".to_vec())
        );
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("user:1", b"a", None).await.unwrap();
        cache.set("products:all", b"b", None).await.unwrap();

        cache.clear().await.unwrap();

        assert!(cache.get("user:1").await.unwrap().is_none());
        assert!(cache.get("products:all").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_keys_with_pattern() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache.set("product:1", b"a", None).await.unwrap();
        cache.set("product:2", b"b", None).await.unwrap();
        cache.set("user:1", b"c", None).await.unwrap();

        let mut keys = cache.list_keys("product:*").await.unwrap();
        keys.sort();

        assert_eq!(keys, vec!["product:1".to_string(), "product:2".to_string()]);
    }

    #[tokio::test]
    async fn test_list_keys_skips_expired() {
        let cache = MemoryCache::new(TEST_MAX_ENTRIES);

        cache
            .set("product:1", b"a", Some(Duration::from_millis(20)))
            .await
            .unwrap();
        cache.set("product:2", b"b", None).await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        let keys = cache.list_keys("*").await.unwrap();
        assert_eq!(keys, vec!["product:2".to_string()]);
    }

    #[tokio::test]
    async fn test_lru_eviction() {
        let cache = MemoryCache::new(3);

        cache.set("key1", b"value1", None).await.unwrap();
        cache.set("key2", b"value2", None).await.unwrap();
        cache.set("key3", b"value3", None).await.unwrap();

        // Touch key1 so key2 becomes the least recently used.
        cache.get("key1").await.unwrap();

        cache.set("key4", b"value4", None).await.unwrap();

        assert!(cache.get("key1").await.unwrap().is_some());
        assert!(cache.get("key2").await.unwrap().is_none());
        assert!(cache.get("key3").await.unwrap().is_some());
        assert!(cache.get("key4").await.unwrap().is_some());
    }

    #[tokio::test]
    #[should_panic(expected = "max_entries must be > 0")]
    async fn test_zero_max_entries_panics() {
        let _ = MemoryCache::new(0);
    }
}
