//! MCP tool implementations.
//!
//! This module contains all tools exposed by the offcache server. Each tool
//! is a free `*_impl` function over a [`Controller`](offcache_core::Controller)
//! so it can be tested without a transport.

pub mod cache;
pub mod lifecycle;
pub mod resource_fetch;

use offcache_core::Error;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;

pub use lifecycle::{NotificationClickParams, PushParams, SyncParams};
pub use resource_fetch::ResourceFetchParams;

/// Render a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
