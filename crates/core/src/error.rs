//! Unified error types for offcache.
//!
//! Every message carries a stable code prefix so hosts can match on it
//! without depending on the enum layout.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the cache controller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., unknown HTTP method).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Invalid URL or locator.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Stored entry could not be decoded.
    #[error("CACHE_ERROR: corrupt entry: {0}")]
    CorruptEntry(String),

    /// Network transport failure (no connectivity, DNS, TLS, reset).
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// A fetch completed with a status the operation cannot accept.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// The network is unreachable and no cached fallback exists.
    #[error("OFFLINE: {0}")]
    Offline(String),

    /// The host runtime refused a client or notification operation.
    #[error("HOST_ERROR: {0}")]
    Host(String),
}

impl Error {
    /// Whether the error means "the device could not reach the network".
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Error::Network(_) | Error::FetchTimeout(_) | Error::Offline(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::CorruptEntry(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::InvalidUrl(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::InvalidUrl(msg) => (-32003, msg.clone()),
            Error::Database(e) => (-32002, e.to_string()),
            Error::MigrationFailed(msg) => (-32002, msg.clone()),
            Error::CorruptEntry(msg) => (-32002, msg.clone()),
            Error::HttpError(msg) => (-32008, msg.clone()),
            Error::Network(msg) => (-32009, msg.clone()),
            Error::FetchTimeout(msg) => (-32006, msg.clone()),
            Error::FetchTooLarge(msg) => (-32007, msg.clone()),
            Error::Offline(msg) => (-32013, msg.clone()),
            Error::Host(msg) => (-32014, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Offline("https://example.com/app.js".to_string());
        assert!(err.to_string().starts_with("OFFLINE"));
        assert!(err.to_string().contains("app.js"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::Offline("x".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32013);
    }

    #[test]
    fn test_connectivity_classification() {
        assert!(Error::Network("reset".into()).is_connectivity());
        assert!(Error::FetchTimeout("20s".into()).is_connectivity());
        assert!(!Error::MigrationFailed("bad".into()).is_connectivity());
    }
}
