//! Cache backend implementations and startup selection.
//!
//! Two backends implement the [`Cache`] contract from `storefront_core`:
//! an in-process LRU cache (always compiled) and a Redis cache behind the
//! `redis` feature. Selection happens once, at startup: when Redis is
//! enabled and reachable it wins; otherwise the process falls back to the
//! in-process cache with a logged warning. The read and invalidation paths
//! are identical either way - only latency and cross-process sharing change.

pub mod memory;
pub mod probe;
#[cfg(feature = "redis")]
pub mod redis_impl;

use std::sync::Arc;

use serde::Serialize;

use storefront_core::cache::Cache;

use crate::config::Config;

pub use memory::MemoryCache;

/// Which backend ended up serving this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    Redis,
    Memory,
}

impl std::fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackend::Redis => write!(f, "redis"),
            CacheBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Connects the configured cache backend.
///
/// Never fails: an unreachable Redis degrades to the in-process cache rather
/// than aborting startup.
#[cfg(feature = "redis")]
pub async fn connect(config: &Config) -> (Arc<dyn Cache>, CacheBackend) {
    if config.redis_enabled {
        match redis_impl::RedisCache::new(&config.redis_url).await {
            Ok(cache) => {
                tracing::info!(url = %config.redis_url, "Connected to Redis cache");
                return (Arc::new(cache), CacheBackend::Redis);
            }
            Err(err) => {
                tracing::warn!(
                    url = %config.redis_url,
                    error = %err,
                    "Redis unavailable, falling back to in-process cache"
                );
            }
        }
    } else {
        tracing::info!("Redis disabled, using in-process cache");
    }

    fallback(config)
}

/// Connects the cache backend; without the `redis` feature this is always
/// the in-process cache.
#[cfg(not(feature = "redis"))]
pub async fn connect(config: &Config) -> (Arc<dyn Cache>, CacheBackend) {
    fallback(config)
}

fn fallback(config: &Config) -> (Arc<dyn Cache>, CacheBackend) {
    (
        Arc::new(MemoryCache::new(config.cache_max_entries)),
        CacheBackend::Memory,
    )
}
