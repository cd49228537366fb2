use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Contract between the entity services and a cache backend.
///
/// Implementations must be safe for concurrent use; the read path performs no
/// locking and concurrent writers to the same key simply overwrite each other.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value by key. An expired entry is reported as absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value with an optional TTL.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Deletes a value by key. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Removes every entry.
    async fn clear(&self) -> Result<()>;

    /// Lists keys matching a glob pattern.
    ///
    /// Diagnostics only; the read and invalidation paths never call this.
    async fn list_keys(&self, pattern: &str) -> Result<Vec<String>>;
}
