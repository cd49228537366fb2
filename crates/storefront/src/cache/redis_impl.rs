//! Redis cache backend.
//!
//! Uses the connection-manager client for pooling and reconnection. `clear`
//! maps to FLUSHDB and `list_keys` to KEYS; both exist for the diagnostic
//! surface only and never run on the request path.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use storefront_core::cache::{Cache, CacheError, Result};

fn map_redis_error(err: redis::RedisError) -> CacheError {
    if err.is_io_error() || err.is_connection_refusal() || err.is_timeout() {
        CacheError::ConnectionFailed(err.to_string())
    } else {
        CacheError::OperationFailed(err.to_string())
    }
}

/// Redis cache backend.
pub struct RedisCache {
    conn: redis::aio::ConnectionManager,
}

impl RedisCache {
    /// Connects to Redis at `url` (e.g. `redis://localhost:6379`).
    ///
    /// # Errors
    ///
    /// Returns `CacheError::ConnectionFailed` when the server is unreachable;
    /// the caller is expected to fall back to the in-process cache.
    pub async fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let result: Option<Vec<u8>> = conn.get(key).await.map_err(map_redis_error)?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();
        match ttl {
            Some(duration) => {
                let seconds = duration.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value, seconds)
                    .await
                    .map_err(map_redis_error)?;
            }
            None => {
                conn.set::<_, _, ()>(key, value)
                    .await
                    .map_err(map_redis_error)?;
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await.map_err(map_redis_error)?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        redis::cmd("FLUSHDB")
            .query_async::<()>(&mut conn)
            .await
            .map_err(map_redis_error)?;
        Ok(())
    }

    async fn list_keys(&self, pattern: &str) -> Result<Vec<String>> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn.keys(pattern).await.map_err(map_redis_error)?;
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    /// Skip test if Redis not available.
    async fn get_test_cache() -> Option<RedisCache> {
        RedisCache::new(&redis_url()).await.ok()
    }

    /// Unique test key to avoid conflicts between test runs.
    fn test_key(suffix: &str) -> String {
        format!("test:redis_cache:{}:{}", Uuid::new_v4(), suffix)
    }

    #[tokio::test]
    async fn test_redis_set_and_get() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("set_get");
        cache.set(&key, b"hello world", None).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), Some(b"hello world".to_vec()));

        cache.delete(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_redis_get_nonexistent() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        assert_eq!(cache.get(&test_key("nonexistent")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_redis_delete() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("delete");
        cache.set(&key, b"to be deleted", None).await.unwrap();
        cache.delete(&key).await.unwrap();
        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_redis_ttl() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("ttl");
        cache
            .set(&key, b"expiring", Some(Duration::from_secs(1)))
            .await
            .unwrap();
        assert!(cache.get(&key).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(cache.get(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_redis_list_keys() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let prefix = test_key("list");
        let key = format!("{prefix}:one");
        cache.set(&key, b"v", None).await.unwrap();

        let keys = cache.list_keys(&format!("{prefix}:*")).await.unwrap();
        assert_eq!(keys, vec![key.clone()]);

        cache.delete(&key).await.unwrap();
    }
}
