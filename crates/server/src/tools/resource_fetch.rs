//! resource_fetch tool implementation.
//!
//! Runs one request through the controller's retrieval path and reports the
//! decision: answered from cache, network, or the offline document, or
//! passed through and fetched directly without touching the cache.

use offcache_client::resolve_resource;
use offcache_core::controller::BypassReason;
use offcache_core::{CacheStore, Controller, Destination, Error, FetchDecision, Network, Request, ResponseSource};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for resource_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResourceFetchParams {
    /// Resource URL. Relative locators resolve against the controller scope.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request destination; "document" marks a page navigation.
    #[serde(default)]
    pub destination: Destination,

    /// Extra request headers as name/value pairs.
    #[serde(default)]
    pub headers: Vec<(String, String)>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for resource_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResourceFetchOutput {
    /// The resolved request URL.
    pub url: String,
    pub method: String,
    /// True when the controller declined to intercept and the request went
    /// straight to the network.
    pub passed_through: bool,
    pub bypass_reason: Option<BypassReason>,
    /// Where an intercepted response came from.
    pub source: Option<ResponseSource>,
    /// URL the response was produced for (after redirects).
    pub response_url: String,
    pub status: u16,
    pub status_text: String,
    pub response_type: String,
    pub content_type: Option<String>,
    /// Body decoded as UTF-8 (lossy).
    pub body: String,
    pub body_bytes: usize,
}

/// Implementation of the resource_fetch tool.
pub async fn fetch_impl<S: CacheStore, N: Network>(
    controller: &Controller<S, N>, params: ResourceFetchParams,
) -> Result<CallToolResult, McpError> {
    if params.method.trim().is_empty() {
        return Err(Error::InvalidInput("method cannot be empty".into()).into());
    }

    let url = resolve_resource(&params.url, &controller.settings().scope).map_err(Error::from)?;
    let mut request = Request::new(params.method.trim(), url, params.destination);
    request.headers = params.headers;

    let method = request.method.clone();
    let url = request.url.to_string();

    let (passed_through, bypass_reason, source, response) = match controller.handle_fetch(request.clone()).await? {
        FetchDecision::PassThrough(reason) => {
            tracing::debug!(url = %request.url, ?reason, "fetching passed-through request directly");
            (true, Some(reason), None, controller.fetch_uncached(&request).await?)
        }
        FetchDecision::Respond { response, source } => (false, None, Some(source), response),
    };

    let output = ResourceFetchOutput {
        url,
        method,
        passed_through,
        bypass_reason,
        source,
        content_type: response.header("content-type").map(str::to_string),
        body: String::from_utf8_lossy(&response.body).into_owned(),
        body_bytes: response.body.len(),
        response_url: response.url,
        status: response.status,
        status_text: response.status_text,
        response_type: response.response_type.as_str().to_string(),
    };

    json_result(&output)
}
