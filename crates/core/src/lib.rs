//! Core types and the offline cache controller.
//!
//! This crate provides:
//! - Durable response store with SQLite backend and cache generations
//! - The controller: install seeding, activation reaping, request
//!   classification and stale-while-revalidate retrieval
//! - Typed lifecycle events and the host callback trait
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod http;
pub mod network;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheDb, CacheStore, RequestKey};
pub use config::{AppConfig, ConfigError};
pub use controller::{Controller, ControllerSettings, FetchDecision, Generation, ResponseSource};
pub use error::Error;
pub use events::{ClientHost, EventOutcome, LifecycleEvent, Notification};
pub use http::{Destination, Request, Response, ResponseType};
pub use network::Network;
