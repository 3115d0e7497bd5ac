//! Stale-while-revalidate retrieval.
//!
//! Lookup prefers the current generation. A hit is answered from the
//! store immediately while a detached task refreshes the entry from the
//! network. A miss goes to the network and
//! stores same-origin `200` responses. A miss that cannot reach the
//! network falls back to the offline document for navigations.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::classify::{BypassReason, Classification};
use super::{Controller, Generation};
use crate::Error;
use crate::cache::{CacheStore, RequestKey};
use crate::http::{Destination, Request, Response, ResponseType};
use crate::network::Network;

/// Where a substituted response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Cache,
    Network,
    OfflineFallback,
}

/// The controller's answer to an intercepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchDecision {
    /// Not intercepted; default network handling applies.
    PassThrough(BypassReason),
    /// The controller substitutes this response.
    Respond { response: Response, source: ResponseSource },
}

impl FetchDecision {
    pub fn response(&self) -> Option<&Response> {
        match self {
            FetchDecision::PassThrough(_) => None,
            FetchDecision::Respond { response, .. } => Some(response),
        }
    }

    pub fn source(&self) -> Option<ResponseSource> {
        match self {
            FetchDecision::PassThrough(_) => None,
            FetchDecision::Respond { source, .. } => Some(*source),
        }
    }
}

impl<S, N> Controller<S, N>
where
    S: CacheStore,
    N: Network,
{
    /// Handle the `fetch` event.
    ///
    /// # Errors
    ///
    /// Store failures during lookup propagate. A miss whose network fetch
    /// fails for lack of connectivity yields `Error::Offline` unless the
    /// request is a document navigation and the offline document is cached.
    /// Any other fetch error is returned unchanged.
    pub async fn handle_fetch(&self, request: Request) -> Result<FetchDecision, Error> {
        if let Classification::Bypass(reason) = self.settings.exclusions.classify(&request) {
            tracing::trace!(url = %request.url, method = %request.method, ?reason, "passing request through");
            return Ok(FetchDecision::PassThrough(reason));
        }

        let key = request.key();

        if let Some(cached) = self.lookup(&key).await? {
            tracing::debug!(url = %request.url, "cache hit");
            self.spawn_refresh(request, key).await;
            return Ok(FetchDecision::Respond { response: cached, source: ResponseSource::Cache });
        }

        tracing::debug!(url = %request.url, "cache miss");

        let response = match self.network.fetch(&request).await {
            Ok(response) => response,
            Err(e) if e.is_connectivity() => return self.offline_fallback(&request, e).await,
            Err(e) => return Err(e),
        };

        if !response.is_cacheable_status() || response.response_type != ResponseType::Basic {
            tracing::debug!(
                url = %request.url,
                status = response.status,
                response_type = response.response_type.as_str(),
                "returning uncached network response"
            );
            return Ok(FetchDecision::Respond { response, source: ResponseSource::Network });
        }

        let copy = response.clone();
        if let Err(e) = self.store.put(self.settings.generation.as_str(), &key, &copy).await {
            tracing::warn!(url = %request.url, error = %e, "failed to store network response");
        }

        Ok(FetchDecision::Respond { response, source: ResponseSource::Network })
    }

    /// Default network handling for a request the controller passed
    /// through. Never reads or writes the store.
    pub async fn fetch_uncached(&self, request: &Request) -> Result<Response, Error> {
        self.network.fetch(request).await
    }

    /// The current generation answers first; older generations still in the
    /// store are searched oldest first.
    async fn lookup(&self, key: &RequestKey) -> Result<Option<Response>, Error> {
        if let Some(found) = self.store.match_in(self.settings.generation.as_str(), key).await? {
            return Ok(Some(found));
        }
        self.store.match_request(key).await
    }

    async fn offline_fallback(&self, request: &Request, cause: Error) -> Result<FetchDecision, Error> {
        tracing::debug!(url = %request.url, error = %cause, "network fetch failed on cache miss");

        if request.destination == Destination::Document {
            let key = RequestKey::get(&self.settings.offline_document);
            if let Some(document) = self.lookup(&key).await? {
                tracing::info!(url = %request.url, "serving offline document");
                return Ok(FetchDecision::Respond { response: document, source: ResponseSource::OfflineFallback });
            }
        }

        Err(Error::Offline(format!("{} ({cause})", request.url)))
    }

    async fn spawn_refresh(&self, request: Request, key: RequestKey) {
        let store = Arc::clone(&self.store);
        let network = Arc::clone(&self.network);
        let generation = self.settings.generation.clone();

        let mut tasks = self.refreshes.lock().await;
        while tasks.try_join_next().is_some() {}
        tasks.spawn(refresh(store, network, generation, request, key));
    }
}

/// Best-effort background update of one entry. Never retried; every
/// failure ends in a log line.
async fn refresh<S, N>(store: Arc<S>, network: Arc<N>, generation: Generation, request: Request, key: RequestKey)
where
    S: CacheStore,
    N: Network,
{
    let fresh = match network.fetch(&request).await {
        Ok(fresh) => fresh,
        Err(e) => {
            tracing::debug!(url = %request.url, error = %e, "refresh skipped, network unavailable");
            return;
        }
    };

    if !fresh.is_cacheable_status() {
        tracing::debug!(url = %request.url, status = fresh.status, "refresh kept cached entry");
        return;
    }

    match store.put(generation.as_str(), &key, &fresh).await {
        Ok(()) => tracing::debug!(url = %request.url, generation = %generation, "refreshed cache entry"),
        Err(e) => tracing::warn!(url = %request.url, error = %e, "failed to store refreshed response"),
    }
}
