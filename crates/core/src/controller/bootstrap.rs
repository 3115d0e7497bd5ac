//! Install-time seeding of a fresh generation.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use url::Url;

use super::Controller;
use crate::Error;
use crate::cache::{CacheStore, RequestKey};
use crate::http::{Request, Response};
use crate::network::Network;

/// Ordered list of resources fetched into every new generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedManifest {
    locators: Vec<String>,
}

impl SeedManifest {
    pub fn new(locators: Vec<String>) -> Self {
        Self { locators }
    }

    pub fn locators(&self) -> &[String] {
        &self.locators
    }

    /// Resolve every locator against `scope`.
    ///
    /// Root-relative locators land on the scope's origin, dot-relative ones
    /// under the scope's directory, absolute ones are kept verbatim.
    pub fn resolve(&self, scope: &Url) -> Result<Vec<Url>, Error> {
        self.locators
            .iter()
            .map(|locator| {
                scope
                    .join(locator)
                    .map_err(|e| Error::InvalidUrl(format!("{locator}: {e}")))
            })
            .collect()
    }
}

/// What an install did to the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct InstallReport {
    pub generation: String,
    /// Whether the whole seed batch was stored.
    pub seeded: bool,
    /// Resolved URLs written into the generation.
    pub resources: Vec<String>,
    /// Why seeding failed, when it did.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<S, N> Controller<S, N>
where
    S: CacheStore,
    N: Network,
{
    /// Handle the `install` event.
    ///
    /// Seeding failures are logged and reported but never fail the install:
    /// the generation is installed with whatever the store already holds.
    pub async fn install(&self) -> InstallReport {
        let generation = self.settings.generation.to_string();
        tracing::info!(generation = %generation, "installing cache generation");

        let report = match self.seed().await {
            Ok(resources) => {
                tracing::info!(generation = %generation, count = resources.len(), "seeded cache generation");
                InstallReport { generation, seeded: true, resources, error: None }
            }
            Err(e) => {
                tracing::error!(generation = %generation, error = %e, "failed to seed cache generation");
                InstallReport { generation, seeded: false, resources: Vec::new(), error: Some(e.to_string()) }
            }
        };

        if let Err(e) = self.host.skip_waiting().await {
            tracing::warn!(error = %e, "host refused skip_waiting");
        }

        report
    }

    /// Fetch the whole manifest, then store it in one batch.
    async fn seed(&self) -> Result<Vec<String>, Error> {
        let generation = self.settings.generation.as_str();
        self.store.open(generation).await?;

        let urls = self.settings.seed_manifest.resolve(&self.settings.scope)?;

        let mut join_set = JoinSet::new();
        for (index, url) in urls.into_iter().enumerate() {
            let network = Arc::clone(&self.network);
            join_set.spawn(async move {
                let result = fetch_seed(network.as_ref(), &url).await;
                (index, url, result)
            });
        }

        let mut fetched: Vec<(usize, RequestKey, Response)> = Vec::with_capacity(join_set.len());
        while let Some(joined) = join_set.join_next().await {
            let (index, url, result) = joined.map_err(|e| Error::Network(format!("seed fetch task failed: {e}")))?;
            // Dropping the set on early return aborts the remaining fetches.
            let response = result?;
            fetched.push((index, RequestKey::get(&url), response));
        }
        fetched.sort_by_key(|(index, _, _)| *index);

        let resources = fetched.iter().map(|(_, key, _)| key.url.clone()).collect();
        let entries: Vec<(RequestKey, Response)> = fetched.into_iter().map(|(_, key, resp)| (key, resp)).collect();
        self.store.put_all(generation, &entries).await?;

        Ok(resources)
    }
}

async fn fetch_seed<N: Network>(network: &N, url: &Url) -> Result<Response, Error> {
    let response = network.fetch(&Request::get(url.clone())).await?;
    if !response.is_cacheable_status() {
        return Err(Error::HttpError(format!("{url} responded with status {}", response.status)));
    }
    Ok(response)
}
