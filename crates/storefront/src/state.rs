//! Application state.
//!
//! Repository trait objects shared by every transport (REST, GraphQL, gRPC).
//! Product and User repositories are wrapped in the cache-aside decorators;
//! Category and Order repositories talk to the backend directly. The cache
//! handle itself is exposed only for the diagnostics endpoints.

use std::sync::Arc;

use storefront_core::cache::Cache;
use storefront_core::storage::{
    CategoryRepository, OrderRepository, ProductRepository, UserRepository,
};

use crate::cache::{self, CacheBackend};
use crate::config::Config;
use crate::storage::cached::{CachedProductRepository, CachedUserRepository};

// Storage features: exactly one must be enabled, they are mutually exclusive
#[cfg(all(feature = "inmemory", feature = "sqlite"))]
compile_error!("Cannot enable both 'inmemory' and 'sqlite' storage features");

#[cfg(not(any(feature = "inmemory", feature = "sqlite")))]
compile_error!("Must enable exactly one storage feature: 'inmemory' or 'sqlite'");

/// Shared application state, cloned per request handler.
#[derive(Clone)]
pub struct AppState {
    /// User repository (cached, wraps the storage backend).
    pub user_repo: Arc<dyn UserRepository>,
    /// Category repository (uncached).
    pub category_repo: Arc<dyn CategoryRepository>,
    /// Product repository (cached, wraps the storage backend).
    pub product_repo: Arc<dyn ProductRepository>,
    /// Order repository (uncached).
    pub order_repo: Arc<dyn OrderRepository>,
    /// Cache handle for the diagnostics endpoints and the liveness probe.
    pub cache: Arc<dyn Cache>,
    /// Which cache backend was selected at startup.
    pub cache_backend: CacheBackend,
}

impl AppState {
    /// Wires the decorators around a storage backend.
    fn build<R>(backend: Arc<R>, cache: Arc<dyn Cache>, cache_backend: CacheBackend, config: &Config) -> Self
    where
        R: UserRepository
            + CategoryRepository
            + ProductRepository
            + OrderRepository
            + 'static,
    {
        let ttl = config.cache_ttl();
        let user_repo = Arc::new(CachedUserRepository::new(
            backend.clone(),
            cache.clone(),
            ttl,
        ));
        let product_repo = Arc::new(CachedProductRepository::new(
            backend.clone(),
            cache.clone(),
            ttl,
        ));

        Self {
            user_repo,
            category_repo: backend.clone(),
            product_repo,
            order_repo: backend,
            cache,
            cache_backend,
        }
    }
}

#[cfg(feature = "inmemory")]
mod inmemory_backend {
    use super::*;
    use crate::storage::InMemoryRepository;

    impl AppState {
        /// Creates AppState with in-memory storage and the configured cache.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let backend = Arc::new(InMemoryRepository::new());
            let (cache, cache_backend) = cache::connect(config).await;
            Ok(Self::build(backend, cache, cache_backend, config))
        }
    }
}

#[cfg(feature = "sqlite")]
mod sqlite_backend {
    use super::*;
    use crate::storage::SqliteRepository;

    impl AppState {
        /// Creates AppState with SQLite storage and the configured cache.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let backend = Arc::new(SqliteRepository::new(&config.sqlite_path).await?);
            let (cache, cache_backend) = cache::connect(config).await;
            Ok(Self::build(backend, cache, cache_backend, config))
        }
    }
}

#[cfg(all(test, feature = "inmemory"))]
mod test_support {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::storage::InMemoryRepository;

    impl AppState {
        /// In-memory everything, for router tests.
        pub(crate) fn for_tests() -> Self {
            let config = Config {
                cache_ttl_seconds: 300,
                cache_max_entries: 1024,
                redis_enabled: false,
                redis_url: String::new(),
                sqlite_path: String::new(),
                grpc_addr: String::new(),
            };
            let backend = Arc::new(InMemoryRepository::new());
            let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new(config.cache_max_entries));
            Self::build(backend, cache, CacheBackend::Memory, &config)
        }
    }
}
