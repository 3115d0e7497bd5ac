//! Background sync, push and notification-click hooks.
//!
//! None of these touch the cache; they exist so the host has one place to
//! deliver every lifecycle event.

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use super::Controller;
use crate::Error;
use crate::cache::CacheStore;
use crate::events::{ACTION_EXPLORE, Notification};
use crate::network::Network;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SyncOutcome {
    pub tag: String,
    /// False for tags the controller does not recognise.
    pub handled: bool,
}

impl<S, N> Controller<S, N>
where
    S: CacheStore,
    N: Network,
{
    /// Handle the `sync` event. The recognised tag is reserved for periodic
    /// refresh and currently only logs.
    pub fn sync(&self, tag: &str) -> SyncOutcome {
        let handled = tag == self.settings.sync_tag;
        if handled {
            tracing::info!(tag, "running background sync");
        } else {
            tracing::debug!(tag, "ignoring unrecognised sync tag");
        }
        SyncOutcome { tag: tag.to_string(), handled }
    }

    /// Handle the `push` event by showing the fixed notification.
    ///
    /// The push payload is not part of the template and is only logged.
    pub async fn push(&self, payload: Option<&str>) -> Result<Notification, Error> {
        tracing::info!(payload_len = payload.map(str::len), "push message received");
        let notification = Notification::from_template(&self.settings.notification, Utc::now());
        self.host.show_notification(&notification).await?;
        Ok(notification)
    }

    /// Handle the `notificationclick` event.
    ///
    /// The notification is always closed first; the `explore` action then
    /// opens the application root. Returns the opened URL, if any.
    pub async fn notification_click(
        &self, action: Option<&str>, notification: &Notification,
    ) -> Result<Option<Url>, Error> {
        tracing::info!(action, "notification clicked");

        if let Err(e) = self.host.close_notification(notification).await {
            tracing::warn!(error = %e, "host failed to close notification");
        }

        if action != Some(ACTION_EXPLORE) {
            return Ok(None);
        }

        let root = self.settings.app_root.clone();
        self.host.open_window(&root).await?;
        Ok(Some(root))
    }
}
