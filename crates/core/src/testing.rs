//! Test doubles shared by the controller tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::Error;
use crate::cache::{CacheDb, CacheStore, EntrySummary, RequestKey};
use crate::controller::{Controller, ControllerSettings, Generation, SeedManifest};
use crate::events::{ClientHost, Notification};
use crate::http::{Request, Response};
use crate::network::Network;

/// Settings with an empty seed manifest for `generation` at `scope`.
pub fn settings_for(generation: &str, scope: Url) -> ControllerSettings {
    let mut settings = ControllerSettings::new(Generation::new(generation).unwrap(), scope).unwrap();
    settings.seed_manifest = SeedManifest::default();
    settings
}

pub fn controller_with<S: CacheStore>(
    settings: ControllerSettings, store: Arc<S>, network: StubNetwork, host: Arc<RecordingHost>,
) -> Controller<S, StubNetwork> {
    Controller::new(settings, store, Arc::new(network), host)
}

#[derive(Default)]
struct StubState {
    routes: Mutex<HashMap<String, Response>>,
    offline: AtomicBool,
    too_large: AtomicBool,
    delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<String>>,
}

/// URL-table network. Unknown URLs answer `404`; offline mode fails every
/// fetch. Clones share state.
#[derive(Clone, Default)]
pub struct StubNetwork {
    state: Arc<StubState>,
}

impl StubNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: &str, response: Response) {
        self.state.routes.lock().unwrap().insert(url.to_string(), response);
    }

    /// Serve a same-origin `200` text body.
    pub fn serve_text(&self, url: &str, body: &'static str) {
        let parsed = Url::parse(url).unwrap();
        self.serve(url, Response::ok(&parsed, body).with_header("content-type", "text/plain"));
    }

    pub fn set_online(&self, online: bool) {
        self.state.offline.store(!online, Ordering::SeqCst);
    }

    /// Fail every fetch as an oversized body.
    pub fn fail_too_large(&self, fail: bool) {
        self.state.too_large.store(fail, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> usize {
        self.state.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.state.calls.lock().unwrap().iter().filter(|u| u.as_str() == url).count()
    }
}

#[async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        self.state.calls.lock().unwrap().push(request.url.to_string());

        let delay = *self.state.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.state.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("{} unreachable", request.url)));
        }

        if self.state.too_large.load(Ordering::SeqCst) {
            return Err(Error::FetchTooLarge(format!("{} body over limit", request.url)));
        }

        let route = self.state.routes.lock().unwrap().get(request.url.as_str()).cloned();
        Ok(route.unwrap_or_else(|| Response::ok(&request.url, "").with_status(404, "Not Found")))
    }
}

/// Host that records every callback.
#[derive(Default)]
pub struct RecordingHost {
    skip_waiting: AtomicUsize,
    claims: AtomicUsize,
    refuse_claims: AtomicBool,
    shown: Mutex<Vec<Notification>>,
    closed: AtomicUsize,
    opened: Mutex<Vec<Url>>,
}

impl RecordingHost {
    pub fn skip_waiting_calls(&self) -> usize {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    pub fn claim_calls(&self) -> usize {
        self.claims.load(Ordering::SeqCst)
    }

    pub fn refuse_claims(&self, refuse: bool) {
        self.refuse_claims.store(refuse, Ordering::SeqCst);
    }

    pub fn shown(&self) -> Vec<Notification> {
        self.shown.lock().unwrap().clone()
    }

    pub fn closed_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> Vec<Url> {
        self.opened.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClientHost for RecordingHost {
    async fn skip_waiting(&self) -> Result<(), Error> {
        self.skip_waiting.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn claim_clients(&self) -> Result<(), Error> {
        if self.refuse_claims.load(Ordering::SeqCst) {
            return Err(Error::Host("claim refused".into()));
        }
        self.claims.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        self.shown.lock().unwrap().push(notification.clone());
        Ok(())
    }

    async fn close_notification(&self, _notification: &Notification) -> Result<(), Error> {
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn open_window(&self, url: &Url) -> Result<(), Error> {
        self.opened.lock().unwrap().push(url.clone());
        Ok(())
    }
}

/// Store wrapper that counts calls and can fail deletes.
pub struct InstrumentedStore {
    inner: CacheDb,
    calls: AtomicUsize,
    fail_deletes: AtomicBool,
}

impl InstrumentedStore {
    pub fn new(inner: CacheDb) -> Self {
        Self { inner, calls: AtomicUsize::new(0), fail_deletes: AtomicBool::new(false) }
    }

    pub fn inner(&self) -> &CacheDb {
        &self.inner
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CacheStore for InstrumentedStore {
    async fn open(&self, generation: &str) -> Result<(), Error> {
        self.record();
        self.inner.open(generation).await
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.record();
        self.inner.keys().await
    }

    async fn delete(&self, generation: &str) -> Result<bool, Error> {
        self.record();
        if self.fail_deletes.load(Ordering::SeqCst) {
            tracing::debug!(generation, "simulating store failure");
            return Err(Error::Database(tokio_rusqlite::Error::ConnectionClosed));
        }
        self.inner.delete(generation).await
    }

    async fn match_request(&self, key: &RequestKey) -> Result<Option<Response>, Error> {
        self.record();
        self.inner.match_request(key).await
    }

    async fn match_in(&self, generation: &str, key: &RequestKey) -> Result<Option<Response>, Error> {
        self.record();
        self.inner.match_in(generation, key).await
    }

    async fn put(&self, generation: &str, key: &RequestKey, response: &Response) -> Result<(), Error> {
        self.record();
        self.inner.put(generation, key, response).await
    }

    async fn put_all(&self, generation: &str, entries: &[(RequestKey, Response)]) -> Result<(), Error> {
        self.record();
        self.inner.put_all(generation, entries).await
    }

    async fn entries(&self, generation: &str) -> Result<Vec<EntrySummary>, Error> {
        self.record();
        self.inner.entries(generation).await
    }
}
