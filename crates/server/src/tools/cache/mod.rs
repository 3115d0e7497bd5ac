//! Cache inspection MCP tools.
//!
//! This module provides read-only views of the generation store.

pub mod list;
pub mod lookup;

pub use list::{CacheListParams, list_impl};
pub use lookup::{CacheLookupParams, lookup_impl};
