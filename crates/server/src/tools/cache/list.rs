//! cache_list tool implementation.
//!
//! Lists generations and the entries stored in each.

use offcache_core::{CacheStore, Controller, Network};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_list tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CacheListParams {
    /// Only list this generation. Lists every generation when omitted.
    #[serde(default)]
    pub generation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListedEntry {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub stored_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListedGeneration {
    pub name: String,
    /// True for the generation the controller writes to.
    pub current: bool,
    pub entries: Vec<ListedEntry>,
}

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListOutput {
    /// Generations, oldest first.
    pub generations: Vec<ListedGeneration>,
}

/// Implementation of the cache_list tool.
pub async fn list_impl<S: CacheStore, N: Network>(
    controller: &Controller<S, N>, params: CacheListParams,
) -> Result<CallToolResult, McpError> {
    let store = controller.store();
    let current = controller.generation().as_str();

    let mut generations = Vec::new();
    for name in store.keys().await? {
        if params.generation.as_deref().is_some_and(|g| g != name) {
            continue;
        }

        let entries = store
            .entries(&name)
            .await?
            .into_iter()
            .map(|e| ListedEntry { method: e.method, url: e.url, status: e.status, stored_at: e.stored_at })
            .collect();

        generations.push(ListedGeneration { current: name == current, name, entries });
    }

    json_result(&CacheListOutput { generations })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{offline_controller, output_json, scope};
    use offcache_core::{RequestKey, Response};

    #[tokio::test]
    async fn test_list_all_generations() {
        let controller = offline_controller("app-v2").await;
        let page = scope().join("index.html").unwrap();
        let db = controller.store();
        db.put_entry("app-v1", &RequestKey::get(&page), &Response::ok(&page, "v1"))
            .await
            .unwrap();
        db.open_generation("app-v2").await.unwrap();

        let result = list_impl(&controller, CacheListParams::default()).await.unwrap();
        let output = output_json(&result);

        let generations = output["generations"].as_array().unwrap();
        assert_eq!(generations.len(), 2);
        assert_eq!(generations[0]["name"], "app-v1");
        assert_eq!(generations[0]["current"], false);
        assert_eq!(generations[0]["entries"][0]["url"], "https://app.example/index.html");
        assert_eq!(generations[1]["name"], "app-v2");
        assert_eq!(generations[1]["current"], true);
    }

    #[tokio::test]
    async fn test_list_single_generation() {
        let controller = offline_controller("app-v1").await;
        controller.store().open_generation("app-v1").await.unwrap();
        controller.store().open_generation("other").await.unwrap();

        let params = CacheListParams { generation: Some("other".into()) };
        let result = list_impl(&controller, params).await.unwrap();
        let output = output_json(&result);

        assert_eq!(output["generations"].as_array().unwrap().len(), 1);
        assert_eq!(output["generations"][0]["name"], "other");
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let controller = offline_controller("app-v1").await;

        let result = list_impl(&controller, CacheListParams::default()).await.unwrap();

        assert_eq!(output_json(&result)["generations"], serde_json::json!([]));
    }
}
