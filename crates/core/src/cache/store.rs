//! The durable response store seam used by the controller.

use async_trait::async_trait;

use super::connection::CacheDb;
use super::entries::EntrySummary;
use super::hash::RequestKey;
use crate::Error;
use crate::http::Response;

/// Durable key→response store organized in named generations.
///
/// Every method is a suspension point; implementations must be safe to
/// call from concurrent interceptions with last-writer-wins semantics.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Open (creating if absent) a generation.
    async fn open(&self, generation: &str) -> Result<(), Error>;

    /// Names of all existing generations, oldest first.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Delete a whole generation. Returns false if it did not exist.
    async fn delete(&self, generation: &str) -> Result<bool, Error>;

    /// Look a request up across every generation.
    async fn match_request(&self, key: &RequestKey) -> Result<Option<Response>, Error>;

    /// Look a request up within a single generation.
    async fn match_in(&self, generation: &str, key: &RequestKey) -> Result<Option<Response>, Error>;

    /// Replace the entry for `key` in `generation`.
    async fn put(&self, generation: &str, key: &RequestKey, response: &Response) -> Result<(), Error>;

    /// Replace several entries atomically.
    async fn put_all(&self, generation: &str, entries: &[(RequestKey, Response)]) -> Result<(), Error>;

    /// Enumerate the keys stored in a generation.
    async fn entries(&self, generation: &str) -> Result<Vec<EntrySummary>, Error>;
}

#[async_trait]
impl CacheStore for CacheDb {
    async fn open(&self, generation: &str) -> Result<(), Error> {
        if self.open_generation(generation).await? {
            tracing::debug!(generation, "created cache generation");
        }
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.generation_names().await
    }

    async fn delete(&self, generation: &str) -> Result<bool, Error> {
        self.delete_generation(generation).await
    }

    async fn match_request(&self, key: &RequestKey) -> Result<Option<Response>, Error> {
        self.match_entry(key).await
    }

    async fn match_in(&self, generation: &str, key: &RequestKey) -> Result<Option<Response>, Error> {
        self.match_entry_in(generation, key).await
    }

    async fn put(&self, generation: &str, key: &RequestKey, response: &Response) -> Result<(), Error> {
        self.put_entry(generation, key, response).await
    }

    async fn put_all(&self, generation: &str, entries: &[(RequestKey, Response)]) -> Result<(), Error> {
        self.put_entries(generation, entries).await
    }

    async fn entries(&self, generation: &str) -> Result<Vec<EntrySummary>, Error> {
        self.list_entries(generation).await
    }
}
