use std::{env, time::Duration};

/// Application configuration loaded from environment variables.
///
/// Constructed once at startup and handed to [`crate::state::AppState::new`];
/// nothing here is global or lazily initialized.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache TTL in seconds (default: 3600). The TTL is a safety net;
    /// explicit invalidation is what keeps entries correct.
    pub cache_ttl_seconds: u64,
    /// Maximum number of in-process cache entries (default: 10,000).
    pub cache_max_entries: usize,
    /// Whether to attempt a Redis connection at startup (default: true).
    /// Only consulted when the `redis` feature is compiled in.
    #[allow(dead_code)]
    pub redis_enabled: bool,
    /// Redis connection URL (default: "redis://localhost:6379").
    #[allow(dead_code)]
    pub redis_url: String,
    /// Path to the SQLite database file (default: "storefront.db").
    /// Only used with the `sqlite` storage feature.
    #[allow(dead_code)]
    pub sqlite_path: String,
    /// Bind address for the gRPC server (default: "0.0.0.0:50051").
    pub grpc_addr: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `CACHE_TTL_SECONDS` - cache TTL in seconds (default: 3600)
    /// - `CACHE_MAX_ENTRIES` - in-process cache capacity (default: 10,000)
    /// - `REDIS_ENABLED` - set to `false` to skip the Redis connection attempt
    /// - `REDIS_URL` - Redis connection URL
    /// - `SQLITE_PATH` - SQLite database path
    /// - `GRPC_ADDR` - gRPC bind address
    pub fn from_env() -> Self {
        Self {
            cache_ttl_seconds: env::var("CACHE_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3600),
            cache_max_entries: env::var("CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            redis_enabled: env::var("REDIS_ENABLED")
                .map(|v| v != "false")
                .unwrap_or(true),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "storefront.db".to_string()),
            grpc_addr: env::var("GRPC_ADDR").unwrap_or_else(|_| "0.0.0.0:50051".to_string()),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
