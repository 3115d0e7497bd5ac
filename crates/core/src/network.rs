//! The network seam.

use async_trait::async_trait;

use crate::Error;
use crate::http::{Request, Response};

/// Performs a request against the network.
///
/// Any HTTP status is a successful fetch. `Err` is reserved for transport
/// failures (no connectivity, DNS, TLS, timeout), which the controller
/// treats as "device is offline".
#[async_trait]
pub trait Network: Send + Sync + 'static {
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}
