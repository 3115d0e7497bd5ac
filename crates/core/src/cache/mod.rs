//! SQLite-backed durable response store.
//!
//! This module provides the persistent store behind the cache controller,
//! using SQLite with async access via tokio-rusqlite. It supports:
//!
//! - Named cache generations with cascading deletes
//! - Request-keyed entries addressed by SHA-256 of method and URL
//! - Atomic batch writes for seeding a generation
//! - Automatic schema migrations and WAL mode

pub mod connection;
pub mod entries;
pub mod generations;
pub mod hash;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use entries::EntrySummary;
pub use hash::RequestKey;
pub use store::CacheStore;
