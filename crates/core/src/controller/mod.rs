//! The offline cache controller.
//!
//! Ties the cache store, the network, and the host runtime together:
//!
//! - `install` seeds the current generation from the seed manifest
//! - `activate` reaps every other generation and claims open clients
//! - `handle_fetch` classifies a request and serves it stale-while-revalidate
//! - `sync`, `push` and `notification_click` are thin host hooks
//!
//! The generation name is injected through [`ControllerSettings`] so that
//! every handler reads the same value and tests can substitute it.

mod bootstrap;
mod classify;
mod hooks;
mod reaper;
mod retrieval;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use url::Url;

use crate::Error;
use crate::cache::CacheStore;
use crate::config::{AppConfig, ConfigError, NotificationConfig};
use crate::events::{ClientHost, EventOutcome, LifecycleEvent};
use crate::network::Network;

pub use bootstrap::{InstallReport, SeedManifest};
pub use classify::{BypassReason, Classification, ExclusionRules};
pub use hooks::SyncOutcome;
pub use reaper::ActivationReport;
pub use retrieval::{FetchDecision, ResponseSource};

/// Name of one cache generation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Generation(String);

impl Generation {
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidInput("generation name cannot be empty".into()));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything a controller instance needs to know about its deployment.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    pub generation: Generation,
    /// The controller's own location.
    pub scope: Url,
    pub seed_manifest: SeedManifest,
    /// Served to document navigations that miss while offline.
    pub offline_document: Url,
    /// Opened by the `explore` notification action.
    pub app_root: Url,
    pub exclusions: ExclusionRules,
    pub sync_tag: String,
    pub notification: NotificationConfig,
}

impl ControllerSettings {
    /// Settings for `generation` at `scope` with default policies.
    pub fn new(generation: Generation, scope: Url) -> Result<Self, Error> {
        Self::from_config_with(&AppConfig::default(), generation, scope)
    }

    /// Build settings from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the scope, offline document, or
    /// generation cannot be used.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let scope = config.scope()?;
        let generation = Generation::new(config.generation.clone())
            .map_err(|e| ConfigError::Invalid { field: "generation".into(), reason: e.to_string() })?;
        Self::from_config_with(config, generation, scope)
            .map_err(|e| ConfigError::Invalid { field: "offline_document".into(), reason: e.to_string() })
    }

    fn from_config_with(config: &AppConfig, generation: Generation, scope: Url) -> Result<Self, Error> {
        let offline_document = scope.join(&config.offline_document)?;
        let app_root = scope.join("/")?;
        Ok(Self {
            generation,
            seed_manifest: SeedManifest::new(config.seed_manifest.clone()),
            offline_document,
            app_root,
            exclusions: ExclusionRules::new(&config.excluded_domains),
            sync_tag: config.sync_tag.clone(),
            notification: config.notification.clone(),
            scope,
        })
    }
}

/// Offline cache controller over a store `S` and a network `N`.
pub struct Controller<S, N> {
    settings: Arc<ControllerSettings>,
    store: Arc<S>,
    network: Arc<N>,
    host: Arc<dyn ClientHost>,
    /// Detached hit-path refreshes; never awaited by the response path.
    refreshes: Mutex<JoinSet<()>>,
}

impl<S, N> Controller<S, N>
where
    S: CacheStore,
    N: Network,
{
    pub fn new(settings: ControllerSettings, store: Arc<S>, network: Arc<N>, host: Arc<dyn ClientHost>) -> Self {
        Self { settings: Arc::new(settings), store, network, host, refreshes: Mutex::new(JoinSet::new()) }
    }

    pub fn settings(&self) -> &ControllerSettings {
        &self.settings
    }

    pub fn generation(&self) -> &Generation {
        &self.settings.generation
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Route one lifecycle event to its handler.
    pub async fn dispatch(&self, event: LifecycleEvent) -> Result<EventOutcome, Error> {
        tracing::debug!(event = event.name(), generation = %self.settings.generation, "dispatching event");
        match event {
            LifecycleEvent::Install => Ok(EventOutcome::Installed(self.install().await)),
            LifecycleEvent::Activate => self.activate().await.map(EventOutcome::Activated),
            LifecycleEvent::Fetch { request } => self.handle_fetch(request).await.map(EventOutcome::Fetch),
            LifecycleEvent::Sync { tag } => Ok(EventOutcome::Synced(self.sync(&tag))),
            LifecycleEvent::Push { payload } => self.push(payload.as_deref()).await.map(EventOutcome::Notified),
            LifecycleEvent::NotificationClick { action, notification } => self
                .notification_click(action.as_deref(), &notification)
                .await
                .map(EventOutcome::NotificationClicked),
        }
    }

    /// Wait for every background refresh spawned so far.
    pub async fn settle_refreshes(&self) {
        let mut tasks = std::mem::take(&mut *self.refreshes.lock().await);
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "background refresh task did not complete");
            }
        }
    }
}
