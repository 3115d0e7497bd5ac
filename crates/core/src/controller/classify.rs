//! Request classification: which intercepted requests the controller
//! answers and which fall through to default network handling.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::http::Request;

/// Why a request was left to the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BypassReason {
    /// Host belongs to an excluded live-data backend.
    ExcludedOrigin,
    /// Method is not GET.
    NonGetMethod,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Eligible,
    Bypass(BypassReason),
}

/// Domains whose traffic is never intercepted.
///
/// A host matches a domain when it equals it or ends with `.` + domain, so
/// `api.supabase.co` matches `supabase.co` while `notsupabase.co` does not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionRules {
    domains: Vec<String>,
}

impl ExclusionRules {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let domains = domains
            .into_iter()
            .map(|d| d.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .collect();
        Self { domains }
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn is_excluded(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        self.domains.iter().any(|domain| {
            host.strip_suffix(domain.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.ends_with('.'))
        })
    }

    /// Decide whether `request` is cache-eligible.
    ///
    /// The origin check comes first, so excluded hosts bypass regardless of
    /// method.
    pub fn classify(&self, request: &Request) -> Classification {
        if self.is_excluded(&request.url) {
            Classification::Bypass(BypassReason::ExcludedOrigin)
        } else if !request.is_get() {
            Classification::Bypass(BypassReason::NonGetMethod)
        } else {
            Classification::Eligible
        }
    }
}
