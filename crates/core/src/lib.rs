//! Core domain types and contracts for the storefront backend.
//!
//! This crate has no I/O dependencies. It defines:
//!
//! - [`commerce`]: the User/Category/Product/Order entities and their write
//!   payloads
//! - [`storage`]: repository traits and the repository error taxonomy
//! - [`cache`]: the cache contract, key derivation, and typed serialization
//!
//! Concrete backends (in-memory, SQLite, Redis) and the transports live in
//! the `storefront` binary crate.

pub mod cache;
pub mod commerce;
pub mod storage;
