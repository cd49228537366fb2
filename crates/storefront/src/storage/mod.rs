//! Storage backends and the cache-aside decorators.
//!
//! A backend implements the four repository traits from `storefront_core`.
//! The `cached` decorators wrap a backend's Product and User repositories
//! with the read-through and invalidation logic; Categories and Orders are
//! served straight from the backend.

pub mod cached;
#[cfg(feature = "inmemory")]
pub mod inmemory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryRepository;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepository;
