//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::cache::{CacheListParams, CacheLookupParams, list_impl, lookup_impl};
use crate::tools::lifecycle::{
    activate_impl, install_impl, notification_click_impl, push_impl, sync_impl,
};
use crate::tools::resource_fetch::fetch_impl;
use crate::tools::{NotificationClickParams, PushParams, ResourceFetchParams, SyncParams};

use offcache_client::FetchClient;
use offcache_core::{CacheDb, Controller, Notification};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use tokio::sync::Mutex;

/// Controller wired to the SQLite store and the HTTP network.
pub type AppController = Controller<CacheDb, FetchClient>;

/// The main MCP server handler for offcache.
#[derive(Clone)]
pub struct OffcacheServer {
    tool_router: ToolRouter<Self>,
    controller: Arc<AppController>,
    /// Last notification shown by `lifecycle_push`.
    shown: Arc<Mutex<Option<Notification>>>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl OffcacheServer {
    /// Create a new server handler.
    pub fn new(controller: Arc<AppController>) -> Self {
        Self { tool_router: Self::tool_router(), controller, shown: Arc::new(Mutex::new(None)) }
    }

    #[tool(
        description = "Deliver the install event: open the current cache generation and seed it with the manifest resources."
    )]
    async fn lifecycle_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.controller).await
    }

    #[tool(description = "Deliver the activate event: delete every cache generation except the current one.")]
    async fn lifecycle_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.controller).await
    }

    /// Intercept a request.
    ///
    /// GET requests outside the excluded domains are answered from cache
    /// (refreshing in the background) or from the network; offline page
    /// navigations fall back to the cached offline document. Everything
    /// else is fetched directly and never cached.
    #[tool(
        description = "Run a request through the offline cache. Returns the decision (cache, network, offline fallback, or pass-through fetched directly) and the response."
    )]
    async fn resource_fetch(&self, params: Parameters<ResourceFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.controller, params.0).await
    }

    #[tool(description = "Deliver a background sync event with the given tag.")]
    async fn lifecycle_sync(&self, params: Parameters<SyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(&self.controller, params.0).await
    }

    #[tool(description = "Deliver a push message. Shows the fixed notification and returns it.")]
    async fn lifecycle_push(&self, params: Parameters<PushParams>) -> Result<CallToolResult, McpError> {
        push_impl(&self.controller, &self.shown, params.0).await
    }

    #[tool(
        description = "Click the last shown notification. The \"explore\" action opens the application root; every click closes the notification."
    )]
    async fn notification_click(&self, params: Parameters<NotificationClickParams>) -> Result<CallToolResult, McpError> {
        notification_click_impl(&self.controller, &self.shown, params.0).await
    }

    #[tool(description = "List cache generations (oldest first) and their stored entries.")]
    async fn cache_list(&self, params: Parameters<CacheListParams>) -> Result<CallToolResult, McpError> {
        list_impl(&self.controller, params.0).await
    }

    #[tool(description = "Look a GET request up in the cache without touching the network.")]
    async fn cache_lookup(&self, params: Parameters<CacheLookupParams>) -> Result<CallToolResult, McpError> {
        lookup_impl(&self.controller, params.0).await
    }
}

impl ServerHandler for OffcacheServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "offcache".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
