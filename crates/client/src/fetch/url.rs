//! Resource locator resolution for requests entering the controller.

/// Error type for locator resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<UrlError> for offcache_core::Error {
    fn from(err: UrlError) -> Self {
        offcache_core::Error::InvalidUrl(err.to_string())
    }
}

/// Resolve a resource locator against the controller scope.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Absolute locators are parsed as-is; anything else is joined onto `scope`
///    (`/index.html` is origin-relative, `app.js` is scope-relative)
/// 3. Only http and https are accepted
/// 4. Lowercase the host
/// 5. Remove fragment (#...)
/// 6. Keep query string intact (do not reorder)
pub fn resolve_resource(input: &str, scope: &url::Url) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = if trimmed.contains("://") {
        url::Url::parse(trimmed)
    } else {
        scope.join(trimmed)
    }
    .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str() {
        let lowered = host.to_lowercase();
        parsed
            .set_host(Some(&lowered))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}
