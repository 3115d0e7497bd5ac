//! Request and response snapshots exchanged between the controller,
//! the network, and the cache store.

use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::cache::hash::RequestKey;

/// Where the requester intends to use the resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    /// A full-page navigation.
    Document,
    Script,
    Style,
    Image,
    Font,
    Manifest,
    Audio,
    Video,
    Worker,
    /// fetch()/XHR and anything else without a specific destination.
    #[default]
    Empty,
}

/// Origin classification of a network response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Same-origin response.
    #[default]
    Basic,
    /// Cross-origin response with readable body.
    Cors,
    /// Cross-origin response without readable body or status.
    Opaque,
    /// Network error surfaced as a response.
    Error,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Basic => "basic",
            ResponseType::Cors => "cors",
            ResponseType::Opaque => "opaque",
            ResponseType::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "basic" => Some(ResponseType::Basic),
            "cors" => Some(ResponseType::Cors),
            "opaque" => Some(ResponseType::Opaque),
            "error" => Some(ResponseType::Error),
            _ => None,
        }
    }
}

/// An intercepted outbound request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Upper-case HTTP method.
    #[serde(deserialize_with = "uppercase_method")]
    pub method: String,
    pub url: Url,
    #[serde(default)]
    pub destination: Destination,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
}

fn uppercase_method<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    String::deserialize(deserializer).map(|m| m.to_ascii_uppercase())
}

impl Request {
    /// Build a request, normalizing the method to upper case.
    pub fn new(method: &str, url: Url, destination: Destination) -> Self {
        Self { method: method.to_ascii_uppercase(), url, destination, headers: Vec::new() }
    }

    /// A plain GET with no particular destination.
    pub fn get(url: Url) -> Self {
        Self::new("GET", url, Destination::Empty)
    }

    /// A top-level document navigation.
    pub fn navigate(url: Url) -> Self {
        Self::new("GET", url, Destination::Document)
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Cache identity of this request.
    pub fn key(&self) -> RequestKey {
        RequestKey::new(&self.method, &self.url)
    }
}

/// A response snapshot.
///
/// The body is reference counted, so `clone()` hands the store its own
/// handle while the caller's copy stays unread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// URL the response was produced for, after redirects.
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub response_type: ResponseType,
}

impl Response {
    /// A same-origin `200 OK` response.
    pub fn ok(url: &Url, body: impl Into<Bytes>) -> Self {
        Self {
            url: url.to_string(),
            status: 200,
            status_text: "OK".into(),
            headers: Vec::new(),
            body: body.into(),
            response_type: ResponseType::Basic,
        }
    }

    pub fn with_status(mut self, status: u16, status_text: &str) -> Self {
        self.status = status;
        self.status_text = status_text.into();
        self
    }

    pub fn with_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.into()));
        self
    }

    /// First value of a header, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the status is exactly 200, the only status the controller
    /// ever writes into the cache.
    pub fn is_cacheable_status(&self) -> bool {
        self.status == 200
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_method_normalized() {
        let req = Request::new("post", Url::parse("https://example.com/").unwrap(), Destination::Empty);
        assert_eq!(req.method, "POST");
        assert!(!req.is_get());
    }

    #[test]
    fn test_deserialized_request_method_normalized() {
        let req: Request = serde_json::from_str(r#"{"method":"get","url":"https://example.com/"}"#).unwrap();
        assert_eq!(req.method, "GET");
        assert!(req.is_get());
        assert_eq!(req.key(), Request::get(Url::parse("https://example.com/").unwrap()).key());
    }

    #[test]
    fn test_destination_serde() {
        let dest: Destination = serde_json::from_str("\"document\"").unwrap();
        assert_eq!(dest, Destination::Document);
        assert_eq!(serde_json::to_string(&Destination::Empty).unwrap(), "\"empty\"");
    }

    #[test]
    fn test_response_type_roundtrip_names() {
        for ty in [ResponseType::Basic, ResponseType::Cors, ResponseType::Opaque, ResponseType::Error] {
            assert_eq!(ResponseType::parse(ty.as_str()), Some(ty));
        }
        assert_eq!(ResponseType::parse("opaqueredirect"), None);
    }

    #[test]
    fn test_response_clone_shares_body() {
        let url = Url::parse("https://example.com/app.js").unwrap();
        let original = Response::ok(&url, "console.log(1)");
        let copy = original.clone();
        assert_eq!(original.body.as_ptr(), copy.body.as_ptr());
        assert_eq!(original, copy);
    }

    #[test]
    fn test_response_header_lookup() {
        let url = Url::parse("https://example.com/").unwrap();
        let resp = Response::ok(&url, "").with_header("Content-Type", "text/html");
        assert_eq!(resp.header("content-type"), Some("text/html"));
        assert!(!resp.with_status(404, "Not Found").is_cacheable_status());
    }
}
