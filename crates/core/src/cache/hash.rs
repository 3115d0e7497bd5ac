//! Request identity and content-addressed cache keys.

use sha2::{Digest, Sha256};
use url::Url;

/// Compute the cache key for a request identity.
pub fn compute_cache_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Identity of a cache entry: method plus URL, fragment stripped.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
    pub hash: String,
}

impl RequestKey {
    pub fn new(method: &str, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        let method = method.to_ascii_uppercase();
        let url = url.to_string();
        let hash = compute_cache_key(&method, &url);
        Self { method, url, hash }
    }

    /// Key for a plain GET of `url`.
    pub fn get(url: &Url) -> Self {
        Self::new("GET", url)
    }
}
