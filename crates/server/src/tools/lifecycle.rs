//! Lifecycle tools: install, activate, sync, push and notification clicks.
//!
//! These drive the controller the way a host would deliver its lifecycle
//! events.

use chrono::Utc;
use offcache_core::{CacheStore, Controller, Network, Notification};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::json_result;

/// Parameters for the lifecycle_sync tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SyncParams {
    /// Sync registration tag.
    pub tag: String,
}

/// Parameters for the lifecycle_push tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PushParams {
    /// Push message payload. Not rendered into the notification.
    #[serde(default)]
    pub payload: Option<String>,
}

/// Parameters for the notification_click tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct NotificationClickParams {
    /// Action identifier: "explore", "close", or omitted for a body click.
    #[serde(default)]
    pub action: Option<String>,
}

/// Output from the notification_click tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct NotificationClickOutput {
    pub action: Option<String>,
    /// Window opened as a result of the click.
    pub opened: Option<String>,
}

pub async fn install_impl<S: CacheStore, N: Network>(controller: &Controller<S, N>) -> Result<CallToolResult, McpError> {
    let report = controller.install().await;
    json_result(&report)
}

pub async fn activate_impl<S: CacheStore, N: Network>(
    controller: &Controller<S, N>,
) -> Result<CallToolResult, McpError> {
    let report = controller.activate().await?;
    json_result(&report)
}

pub async fn sync_impl<S: CacheStore, N: Network>(
    controller: &Controller<S, N>, params: SyncParams,
) -> Result<CallToolResult, McpError> {
    json_result(&controller.sync(&params.tag))
}

/// Show the push notification and remember it for a later click.
pub async fn push_impl<S: CacheStore, N: Network>(
    controller: &Controller<S, N>, shown: &Mutex<Option<Notification>>, params: PushParams,
) -> Result<CallToolResult, McpError> {
    let notification = controller.push(params.payload.as_deref()).await?;
    *shown.lock().await = Some(notification.clone());
    json_result(&notification)
}

/// Click the most recently shown notification.
///
/// With nothing shown yet, a fresh template notification stands in.
pub async fn notification_click_impl<S: CacheStore, N: Network>(
    controller: &Controller<S, N>, shown: &Mutex<Option<Notification>>, params: NotificationClickParams,
) -> Result<CallToolResult, McpError> {
    let notification = shown
        .lock()
        .await
        .take()
        .unwrap_or_else(|| Notification::from_template(&controller.settings().notification, Utc::now()));

    let opened = controller
        .notification_click(params.action.as_deref(), &notification)
        .await?;

    json_result(&NotificationClickOutput { action: params.action, opened: opened.map(|u| u.to_string()) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{offline_controller, output_json};

    #[tokio::test]
    async fn test_install_offline_reports_failure() {
        let controller = offline_controller("app-v1").await;

        let result = install_impl(&controller).await.unwrap();
        let output = output_json(&result);

        assert_eq!(output["generation"], "app-v1");
        assert_eq!(output["seeded"], false);
        assert!(output["error"].is_string());
        assert_eq!(controller.store().generation_names().await.unwrap(), vec!["app-v1".to_string()]);
    }

    #[tokio::test]
    async fn test_activate_reaps() {
        let controller = offline_controller("app-v2").await;
        controller.store().open_generation("app-v1").await.unwrap();

        let result = activate_impl(&controller).await.unwrap();
        let output = output_json(&result);

        assert_eq!(output["deleted"], serde_json::json!(["app-v1"]));
        assert_eq!(output["clients_claimed"], true);
    }

    #[tokio::test]
    async fn test_sync() {
        let controller = offline_controller("app-v1").await;

        let result = sync_impl(&controller, SyncParams { tag: "background-sync".into() })
            .await
            .unwrap();

        assert_eq!(output_json(&result)["handled"], true);
    }

    #[tokio::test]
    async fn test_push_then_explore() {
        let controller = offline_controller("app-v1").await;
        let shown = Mutex::new(None);

        let result = push_impl(&controller, &shown, PushParams { payload: Some("hi".into()) })
            .await
            .unwrap();
        let output = output_json(&result);
        assert_eq!(output["title"], "Home Barcodes");
        assert_eq!(output["options"]["data"]["primaryKey"], 1);
        assert!(shown.lock().await.is_some());

        let params = NotificationClickParams { action: Some("explore".into()) };
        let result = notification_click_impl(&controller, &shown, params).await.unwrap();

        assert_eq!(output_json(&result)["opened"], "https://app.example/");
        assert!(shown.lock().await.is_none());
    }

    #[tokio::test]
    async fn test_click_without_push_closes_only() {
        let controller = offline_controller("app-v1").await;
        let shown = Mutex::new(None);

        let params = NotificationClickParams { action: Some("close".into()) };
        let result = notification_click_impl(&controller, &shown, params).await.unwrap();

        assert!(output_json(&result)["opened"].is_null());
    }
}
