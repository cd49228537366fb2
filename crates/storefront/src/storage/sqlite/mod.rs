//! SQLite storage backend.

mod error;
mod repository;
mod schema;

pub use repository::SqliteRepository;
