//! Activation: reap stale generations, then claim open clients.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::Controller;
use crate::Error;
use crate::cache::CacheStore;
use crate::network::Network;

/// What an activation removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ActivationReport {
    pub generation: String,
    /// Generations deleted, oldest first.
    pub deleted: Vec<String>,
    pub clients_claimed: bool,
}

impl<S, N> Controller<S, N>
where
    S: CacheStore,
    N: Network,
{
    /// Handle the `activate` event.
    ///
    /// # Errors
    ///
    /// Any store failure while enumerating or deleting generations fails
    /// the activation. A refused client claim is only logged.
    pub async fn activate(&self) -> Result<ActivationReport, Error> {
        let current = self.settings.generation.as_str();
        tracing::info!(generation = current, "activating cache generation");

        let mut deleted = Vec::new();
        for name in self.store.keys().await? {
            if name == current {
                continue;
            }
            tracing::info!(generation = %name, "deleting stale cache generation");
            self.store.delete(&name).await?;
            deleted.push(name);
        }

        let clients_claimed = match self.host.claim_clients().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "host refused client claim");
                false
            }
        };

        Ok(ActivationReport { generation: current.to_string(), deleted, clients_claimed })
    }
}
