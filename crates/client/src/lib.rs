//! Network client for offcache.
//!
//! This crate provides the reqwest-backed [`offcache_core::Network`]
//! implementation and locator resolution used by the server.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig, UrlError, classify_response_type, resolve_resource};
