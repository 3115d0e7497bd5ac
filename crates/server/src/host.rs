//! Host callbacks for a headless controller.
//!
//! The stdio server has no pages or notification tray of its own, so every
//! host request is recorded in the log instead.

use async_trait::async_trait;
use offcache_core::{ClientHost, Error, Notification};
use url::Url;

pub struct LoggingHost;

#[async_trait]
impl ClientHost for LoggingHost {
    async fn skip_waiting(&self) -> Result<(), Error> {
        tracing::info!("controller activating without waiting");
        Ok(())
    }

    async fn claim_clients(&self) -> Result<(), Error> {
        tracing::info!("controller claimed open clients");
        Ok(())
    }

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        tracing::info!(
            title = %notification.title,
            body = %notification.options.body,
            actions = notification.options.actions.len(),
            "showing notification"
        );
        Ok(())
    }

    async fn close_notification(&self, notification: &Notification) -> Result<(), Error> {
        tracing::info!(title = %notification.title, "closing notification");
        Ok(())
    }

    async fn open_window(&self, url: &Url) -> Result<(), Error> {
        tracing::info!(%url, "opening window");
        Ok(())
    }
}
