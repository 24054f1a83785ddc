//! Request descriptors shared by the fetchers, the cache keyer and errors.
//!
//! A request is identified by its URL plus [`FetchOptions`]. Headers live in a
//! `BTreeMap`, so two option sets that differ only in insertion order
//! serialize (and therefore hash) identically.

pub mod url;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use url::{UrlError, canonicalize};

/// HTTP method for an outbound request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
        }
    }

    /// Parse a method name case-insensitively; unknown names are `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "post" => Some(HttpMethod::Post),
            "put" => Some(HttpMethod::Put),
            "delete" => Some(HttpMethod::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied request options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOptions {
    /// Request method (default: GET).
    #[serde(default)]
    pub method: HttpMethod,

    /// Optional request body, sent verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,

    /// Extra request headers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl FetchOptions {
    /// Plain GET with no body and no extra headers.
    pub fn get() -> Self {
        Self::default()
    }

    /// POST carrying a JSON body.
    pub fn post_json(payload: impl Into<String>) -> Self {
        Self::default()
            .with_method(HttpMethod::Post)
            .with_payload(payload)
            .with_header("content-type", "application/json")
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Add a header. Names are lowercased since HTTP header names are case-insensitive.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Stable textual form used for cache keys.
    ///
    /// Header names are lowercased here as well, since `headers` can be filled
    /// directly or deserialized without going through [`FetchOptions::with_header`].
    pub fn canonical(&self) -> String {
        let normalized = Self {
            method: self.method,
            payload: self.payload.clone(),
            headers: self
                .headers
                .iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value.clone()))
                .collect(),
        };
        serde_json::to_string(&normalized).unwrap_or_else(|_| self.method.to_string())
    }
}

impl fmt::Display for FetchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method={}", self.method)?;
        if let Some(payload) = &self.payload {
            write!(f, " payload={} bytes", payload.len())?;
        }
        if !self.headers.is_empty() {
            let names: Vec<&str> = self.headers.keys().map(String::as_str).collect();
            write!(f, " headers=[{}]", names.join(","))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_get() {
        let options = FetchOptions::default();
        assert_eq!(options.method, HttpMethod::Get);
        assert!(options.payload.is_none());
        assert!(options.headers.is_empty());
    }

    #[test]
    fn test_canonical_ignores_header_order() {
        let a = FetchOptions::get().with_header("Accept", "application/json").with_header("x-a", "1");
        let b = FetchOptions::get().with_header("x-a", "1").with_header("accept", "application/json");
        assert_eq!(a, b);
        assert_eq!(a.canonical(), b.canonical());
    }

    #[test]
    fn test_canonical_ignores_header_case_in_raw_map() {
        let mut direct = FetchOptions::get();
        direct.headers.insert("Accept".into(), "application/json".into());
        let built = FetchOptions::get().with_header("accept", "application/json");
        let parsed: FetchOptions = serde_json::from_str(r#"{"headers":{"ACCEPT":"application/json"}}"#).unwrap();

        assert_eq!(direct.canonical(), built.canonical());
        assert_eq!(parsed.canonical(), built.canonical());
    }

    #[test]
    fn test_canonical_differs_by_method() {
        let get = FetchOptions::get();
        let post = FetchOptions::get().with_method(HttpMethod::Post);
        assert_ne!(get.canonical(), post.canonical());
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(HttpMethod::parse("POST"), Some(HttpMethod::Post));
        assert_eq!(HttpMethod::parse(" get "), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::parse("patch"), None);
    }

    #[test]
    fn test_display_omits_payload_body() {
        let options = FetchOptions::post_json("[1,2,3]");
        let shown = options.to_string();
        assert!(shown.contains("method=post"));
        assert!(shown.contains("payload=7 bytes"));
        assert!(!shown.contains("[1,2,3]"));
    }
}
