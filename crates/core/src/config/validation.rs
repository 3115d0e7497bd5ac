//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if `generation` is empty, and
    /// `ConfigError::Invalid` if:
    /// - `scope_url` is not an absolute http(s) URL
    /// - a seed locator or the offline document cannot be resolved
    /// - an excluded domain is blank
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.generation.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "generation".into(),
                hint: "Set OFFCACHE_GENERATION to a versioned cache name".into(),
            });
        }

        let scope = self.scope()?;

        for locator in &self.seed_manifest {
            scope.join(locator).map_err(|e| ConfigError::Invalid {
                field: "seed_manifest".into(),
                reason: format!("{locator}: {e}"),
            })?;
        }

        scope.join(&self.offline_document).map_err(|e| ConfigError::Invalid {
            field: "offline_document".into(),
            reason: e.to_string(),
        })?;

        if self.excluded_domains.iter().any(|d| d.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                field: "excluded_domains".into(),
                reason: "entries must not be blank".into(),
            });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.seed_manifest.is_empty() {
            tracing::warn!("seed_manifest is empty; installs will create an empty generation");
        }

        Ok(())
    }
}
