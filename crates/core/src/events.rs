//! Lifecycle events delivered by the host runtime, their outcomes, and the
//! host operations the controller may call back into.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::Error;
use crate::config::NotificationConfig;
use crate::controller::{ActivationReport, FetchDecision, InstallReport, SyncOutcome};
use crate::http::Request;

/// Action id that opens the application from a notification.
pub const ACTION_EXPLORE: &str = "explore";
/// Action id that only dismisses a notification.
pub const ACTION_CLOSE: &str = "close";

/// One event from the host runtime, with its typed payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LifecycleEvent {
    /// A new generation is being installed.
    Install,
    /// The installed generation is taking over.
    Activate,
    /// An outbound request was intercepted.
    Fetch { request: Request },
    /// A background sync fired.
    Sync { tag: String },
    /// A push message arrived.
    Push {
        #[serde(default)]
        payload: Option<String>,
    },
    /// The user clicked a notification or one of its actions.
    #[serde(rename = "notificationclick")]
    NotificationClick {
        #[serde(default)]
        action: Option<String>,
        notification: Notification,
    },
}

impl LifecycleEvent {
    pub fn name(&self) -> &'static str {
        match self {
            LifecycleEvent::Install => "install",
            LifecycleEvent::Activate => "activate",
            LifecycleEvent::Fetch { .. } => "fetch",
            LifecycleEvent::Sync { .. } => "sync",
            LifecycleEvent::Push { .. } => "push",
            LifecycleEvent::NotificationClick { .. } => "notificationclick",
        }
    }
}

/// Result of dispatching one event.
#[derive(Debug)]
pub enum EventOutcome {
    Installed(InstallReport),
    Activated(ActivationReport),
    Fetch(FetchDecision),
    Synced(SyncOutcome),
    Notified(Notification),
    /// Notification closed; carries the window that was opened, if any.
    NotificationClicked(Option<Url>),
}

/// Payload attached to every notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    /// Arrival time, epoch milliseconds.
    pub date_of_arrival: i64,
    pub primary_key: u32,
}

/// A button shown on a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
    pub icon: String,
}

/// Display options of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NotificationOptions {
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: [u32; 3],
    pub data: NotificationData,
    pub actions: Vec<NotificationAction>,
}

/// A notification as handed to and returned from the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Notification {
    pub title: String,
    pub options: NotificationOptions,
}

impl Notification {
    /// Render the fixed push template.
    pub fn from_template(template: &NotificationConfig, arrived_at: DateTime<Utc>) -> Self {
        Self {
            title: template.title.clone(),
            options: NotificationOptions {
                body: template.body.clone(),
                icon: template.icon.clone(),
                badge: template.badge.clone(),
                vibrate: template.vibrate,
                data: NotificationData { date_of_arrival: arrived_at.timestamp_millis(), primary_key: 1 },
                actions: vec![
                    NotificationAction {
                        action: ACTION_EXPLORE.into(),
                        title: template.explore_title.clone(),
                        icon: template.explore_icon.clone(),
                    },
                    NotificationAction {
                        action: ACTION_CLOSE.into(),
                        title: template.close_title.clone(),
                        icon: template.close_icon.clone(),
                    },
                ],
            },
        }
    }
}

/// Operations the host runtime performs on the controller's behalf.
#[async_trait]
pub trait ClientHost: Send + Sync {
    /// Activate the installing generation without waiting for old clients.
    async fn skip_waiting(&self) -> Result<(), Error>;

    /// Take control of every open client context.
    async fn claim_clients(&self) -> Result<(), Error>;

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error>;

    async fn close_notification(&self, notification: &Notification) -> Result<(), Error>;

    /// Open a new client window at `url`.
    async fn open_window(&self, url: &Url) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_notification_wire_schema() {
        let arrived = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let notification = Notification::from_template(&NotificationConfig::default(), arrived);
        let json = serde_json::to_value(&notification.options).unwrap();

        assert_eq!(json["vibrate"], serde_json::json!([100, 50, 100]));
        assert_eq!(json["data"]["dateOfArrival"], 1_700_000_000_123i64);
        assert_eq!(json["data"]["primaryKey"], 1);
        assert_eq!(json["actions"][0]["action"], "explore");
        assert_eq!(json["actions"][1]["action"], "close");
        assert_eq!(json["badge"], "/icons/icon-72x72.png");
    }

    #[test]
    fn test_event_tagging() {
        let event: LifecycleEvent = serde_json::from_str(r#"{"type":"sync","tag":"background-sync"}"#).unwrap();
        assert!(matches!(event, LifecycleEvent::Sync { ref tag } if tag == "background-sync"));

        let event: LifecycleEvent = serde_json::from_str(r#"{"type":"install"}"#).unwrap();
        assert_eq!(event.name(), "install");

        let event: LifecycleEvent = serde_json::from_str(
            r#"{"type":"fetch","request":{"method":"GET","url":"https://app.example/","destination":"document"}}"#,
        )
        .unwrap();
        assert_eq!(event.name(), "fetch");
    }

    #[test]
    fn test_notificationclick_tag() {
        let notification = Notification::from_template(&NotificationConfig::default(), Utc::now());
        let event = LifecycleEvent::NotificationClick { action: Some("explore".into()), notification };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "notificationclick");
    }
}
