//! Cache-aside repository decorators.
//!
//! Reads go through the cache and populate it on miss; mutations hit the
//! underlying repository first and only then touch the cache, deleting every
//! list key the change could have staled and refreshing the single-entity
//! key. Cache failures never fail a request: reads fall through to the
//! store, and invalidation is attempted per key with failures logged.

mod product;
mod user;

use std::future::Future;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use storefront_core::cache::{from_cache_bytes, to_cache_bytes, Cache};
use storefront_core::storage::Result;

pub use product::CachedProductRepository;
pub use user::CachedUserRepository;

/// Serves a read from the cache, falling back to `loader` on a miss.
///
/// A loaded `Some` value is written back under `key` with `ttl` before being
/// returned; `None` is returned without caching, so a not-found result is
/// re-checked against the store on every read (no negative caching). Cache
/// errors and corrupt entries are logged and treated as misses.
pub(crate) async fn read_through<T, F, Fut>(
    cache: &dyn Cache,
    key: &str,
    ttl: Duration,
    loader: F,
) -> Result<Option<T>>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    match cache.get(key).await {
        Ok(Some(bytes)) => match from_cache_bytes::<T>(&bytes) {
            Ok(value) => {
                tracing::trace!(key, "Cache hit");
                return Ok(Some(value));
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "Corrupt cache entry, treating as miss");
            }
        },
        Ok(None) => {
            tracing::trace!(key, "Cache miss");
        }
        Err(err) => {
            tracing::warn!(key, error = %err, "Cache unavailable, falling through to store");
        }
    }

    let value = loader().await?;

    if let Some(v) = &value {
        match to_cache_bytes(v) {
            Ok(bytes) => {
                if let Err(err) = cache.set(key, &bytes, Some(ttl)).await {
                    tracing::warn!(key, error = %err, "Failed to populate cache");
                }
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "Failed to serialize cache value");
            }
        }
    }

    Ok(value)
}

/// Best-effort single-key invalidation; failure is logged and swallowed so
/// the remaining keys of a fan-out are still attempted.
pub(crate) async fn invalidate(cache: &dyn Cache, key: &str) {
    if let Err(err) = cache.delete(key).await {
        tracing::warn!(key, error = %err, "Failed to invalidate cache key");
    }
}

/// Best-effort overwrite used to pre-warm a single-entity key after a
/// create or update, so the next read is served hot.
pub(crate) async fn refresh<T: Serialize>(cache: &dyn Cache, key: &str, value: &T, ttl: Duration) {
    match to_cache_bytes(value) {
        Ok(bytes) => {
            if let Err(err) = cache.set(key, &bytes, Some(ttl)).await {
                tracing::warn!(key, error = %err, "Failed to refresh cache key");
            }
        }
        Err(err) => {
            tracing::warn!(key, error = %err, "Failed to serialize refreshed cache value");
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Cache doubles shared by the decorator tests.

    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::RwLock;

    use storefront_core::cache::{pattern_matches, Cache, CacheError, Result};

    /// Plain map-backed cache that ignores TTLs.
    #[derive(Default)]
    pub struct MockCache {
        pub store: RwLock<HashMap<String, Vec<u8>>>,
    }

    impl MockCache {
        pub fn new() -> Self {
            Self::default()
        }

        pub async fn contains(&self, key: &str) -> bool {
            self.store.read().await.contains_key(key)
        }

        pub async fn insert_raw(&self, key: &str, value: &[u8]) {
            self.store
                .write()
                .await
                .insert(key.to_string(), value.to_vec());
        }
    }

    #[async_trait]
    impl Cache for MockCache {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
            Ok(self.store.read().await.get(key).cloned())
        }

        async fn set(&self, key: &str, value: &[u8], _ttl: Option<Duration>) -> Result<()> {
            self.store
                .write()
                .await
                .insert(key.to_string(), value.to_vec());
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<()> {
            self.store.write().await.remove(key);
            Ok(())
        }

        async fn clear(&self) -> Result<()> {
            self.store.write().await.clear();
            Ok(())
        }

        async fn list_keys(&self, pattern: &str) -> Result<Vec<String>> {
            Ok(self
                .store
                .read()
                .await
                .keys()
                .filter(|k| pattern_matches(pattern, k))
                .cloned()
                .collect())
        }
    }

    /// Cache double whose every operation fails, for fail-open tests.
    pub struct FailingCache;

    #[async_trait]
    impl Cache for FailingCache {
        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            Err(CacheError::ConnectionFailed("forced failure".to_string()))
        }

        async fn set(&self, _key: &str, _value: &[u8], _ttl: Option<Duration>) -> Result<()> {
            Err(CacheError::ConnectionFailed("forced failure".to_string()))
        }

        async fn delete(&self, _key: &str) -> Result<()> {
            Err(CacheError::ConnectionFailed("forced failure".to_string()))
        }

        async fn clear(&self) -> Result<()> {
            Err(CacheError::ConnectionFailed("forced failure".to_string()))
        }

        async fn list_keys(&self, _pattern: &str) -> Result<Vec<String>> {
            Err(CacheError::ConnectionFailed("forced failure".to_string()))
        }
    }
}
