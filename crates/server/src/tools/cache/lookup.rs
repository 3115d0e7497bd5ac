//! cache_lookup tool implementation.
//!
//! Looks a GET request up in the store without touching the network.

use offcache_client::resolve_resource;
use offcache_core::{CacheStore, Controller, Error, Network, RequestKey};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_lookup tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheLookupParams {
    /// Resource URL. Relative locators resolve against the controller scope.
    pub url: String,

    /// Search only this generation instead of every generation.
    #[serde(default)]
    pub generation: Option<String>,
}

/// Output from the cache_lookup tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheLookupOutput {
    pub url: String,
    pub key_hash: String,
    pub found: bool,
    pub status: Option<u16>,
    pub response_type: Option<String>,
    pub body_bytes: Option<usize>,
}

/// Implementation of the cache_lookup tool.
pub async fn lookup_impl<S: CacheStore, N: Network>(
    controller: &Controller<S, N>, params: CacheLookupParams,
) -> Result<CallToolResult, McpError> {
    let url = resolve_resource(&params.url, &controller.settings().scope).map_err(Error::from)?;
    let key = RequestKey::get(&url);

    let found = match params.generation.as_deref() {
        Some(generation) => controller.store().match_in(generation, &key).await?,
        None => controller.store().match_request(&key).await?,
    };

    let output = CacheLookupOutput {
        url: key.url.clone(),
        key_hash: key.hash.clone(),
        found: found.is_some(),
        status: found.as_ref().map(|r| r.status),
        response_type: found.as_ref().map(|r| r.response_type.as_str().to_string()),
        body_bytes: found.as_ref().map(|r| r.body.len()),
    };

    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{offline_controller, output_json, scope};
    use offcache_core::Response;

    #[tokio::test]
    async fn test_lookup_across_and_within_generations() {
        let controller = offline_controller("app-v2").await;
        let page = scope().join("manifest.json").unwrap();
        controller
            .store()
            .put_entry("app-v1", &RequestKey::get(&page), &Response::ok(&page, "{}"))
            .await
            .unwrap();

        let params = CacheLookupParams { url: "/manifest.json".into(), generation: None };
        let output = output_json(&lookup_impl(&controller, params).await.unwrap());
        assert_eq!(output["found"], true);
        assert_eq!(output["status"], 200);
        assert_eq!(output["body_bytes"], 2);

        let params = CacheLookupParams { url: "/manifest.json".into(), generation: Some("app-v2".into()) };
        let output = output_json(&lookup_impl(&controller, params).await.unwrap());
        assert_eq!(output["found"], false);
        assert!(output["status"].is_null());
    }

    #[tokio::test]
    async fn test_lookup_ignores_fragment() {
        let controller = offline_controller("app-v1").await;
        let page = scope().join("index.html").unwrap();
        controller
            .store()
            .put_entry("app-v1", &RequestKey::get(&page), &Response::ok(&page, "x"))
            .await
            .unwrap();

        let params = CacheLookupParams { url: "/index.html#top".into(), generation: None };
        let output = output_json(&lookup_impl(&controller, params).await.unwrap());

        assert_eq!(output["found"], true);
        assert_eq!(output["url"], "https://app.example/index.html");
    }
}
