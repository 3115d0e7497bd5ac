//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (OFFCACHE_*)
//! 2. TOML config file (if OFFCACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use url::Url;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (OFFCACHE_*)
/// 2. TOML config file (if OFFCACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite response store.
    ///
    /// Set via OFFCACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Name of the current cache generation. Bump the version tag on every
    /// deploy so activation reaps the previous generation.
    ///
    /// Set via OFFCACHE_GENERATION environment variable.
    #[serde(default = "default_generation")]
    pub generation: String,

    /// Location of the controller itself. Seed locators and the offline
    /// document are resolved against it, and its origin decides which
    /// responses count as same-origin.
    ///
    /// Set via OFFCACHE_SCOPE_URL environment variable.
    #[serde(default = "default_scope_url")]
    pub scope_url: String,

    /// Resources fetched into a fresh generation on install, in order.
    #[serde(default = "default_seed_manifest")]
    pub seed_manifest: Vec<String>,

    /// Document served to navigations that miss the cache while offline.
    #[serde(default = "default_offline_document")]
    pub offline_document: String,

    /// Backend domains whose requests are never intercepted.
    #[serde(default = "default_excluded_domains")]
    pub excluded_domains: Vec<String>,

    /// Background sync tag the controller answers to.
    #[serde(default = "default_sync_tag")]
    pub sync_tag: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via OFFCACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via OFFCACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via OFFCACHE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Maximum number of redirects followed per fetch.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Push notification template.
    ///
    /// Nested keys are set via OFFCACHE_NOTIFICATION__<FIELD>.
    #[serde(default)]
    pub notification: NotificationConfig,
}

/// Fixed template rendered for every push event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_notification_title")]
    pub title: String,
    #[serde(default = "default_notification_body")]
    pub body: String,
    #[serde(default = "default_notification_icon")]
    pub icon: String,
    #[serde(default = "default_notification_badge")]
    pub badge: String,
    #[serde(default = "default_vibrate")]
    pub vibrate: [u32; 3],
    #[serde(default = "default_explore_title")]
    pub explore_title: String,
    #[serde(default = "default_explore_icon")]
    pub explore_icon: String,
    #[serde(default = "default_close_title")]
    pub close_title: String,
    #[serde(default = "default_close_icon")]
    pub close_icon: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./offcache.sqlite")
}

fn default_generation() -> String {
    "app-cache-v1".into()
}

fn default_scope_url() -> String {
    "http://localhost:8080/".into()
}

fn default_seed_manifest() -> Vec<String> {
    vec![
        "./".into(),
        "./index.html".into(),
        "./manifest.json".into(),
        "https://unpkg.com/@supabase/supabase-js@2/dist/umd/supabase.js".into(),
        "./icons/icon-192x192.png".into(),
        "./icons/icon-512x512.png".into(),
    ]
}

fn default_offline_document() -> String {
    "/index.html".into()
}

fn default_excluded_domains() -> Vec<String> {
    vec!["supabase.co".into()]
}

fn default_sync_tag() -> String {
    "background-sync".into()
}

fn default_user_agent() -> String {
    "offcache/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_max_redirects() -> usize {
    5
}

fn default_notification_title() -> String {
    "Home Barcodes".into()
}

fn default_notification_body() -> String {
    "New barcodes have been updated.".into()
}

fn default_notification_icon() -> String {
    "/icons/icon-192x192.png".into()
}

fn default_notification_badge() -> String {
    "/icons/icon-72x72.png".into()
}

fn default_vibrate() -> [u32; 3] {
    [100, 50, 100]
}

fn default_explore_title() -> String {
    "View barcodes".into()
}

fn default_explore_icon() -> String {
    "/icons/checkmark.png".into()
}

fn default_close_title() -> String {
    "Close".into()
}

fn default_close_icon() -> String {
    "/icons/xmark.png".into()
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: default_notification_title(),
            body: default_notification_body(),
            icon: default_notification_icon(),
            badge: default_notification_badge(),
            vibrate: default_vibrate(),
            explore_title: default_explore_title(),
            explore_icon: default_explore_icon(),
            close_title: default_close_title(),
            close_icon: default_close_icon(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            generation: default_generation(),
            scope_url: default_scope_url(),
            seed_manifest: default_seed_manifest(),
            offline_document: default_offline_document(),
            excluded_domains: default_excluded_domains(),
            sync_tag: default_sync_tag(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            max_redirects: default_max_redirects(),
            notification: NotificationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The parsed controller scope.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `scope_url` is not an absolute
    /// http(s) URL.
    pub fn scope(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.scope_url)
            .map_err(|e| ConfigError::Invalid { field: "scope_url".into(), reason: e.to_string() })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ConfigError::Invalid {
                field: "scope_url".into(),
                reason: format!("unsupported scheme: {scheme}"),
            }),
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `OFFCACHE_`
    /// 2. TOML file from `OFFCACHE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("OFFCACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("OFFCACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
