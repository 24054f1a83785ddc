//! HTTP fetch pipeline for ESI and SDE resources.
//!
//! ### Transport
//! - [`HttpTransport`] is the seam between fetch logic and the network.
//! - [`FetchClient`] is the reqwest implementation: canonicalized URLs,
//!   configurable timeout, response size limit, gzip/brotli/deflate.
//! - Non-success statuses are returned, not raised; callers decide.
//!
//! ### Fetch strategies
//! - [`PageFetcher`]: follows the `x-pages` header and concatenates pages.
//! - [`CachedFetcher`]: single resource behind the chunked cache.

pub mod cached;
pub mod pages;

#[cfg(test)]
pub(crate) mod testing;

use bytes::Bytes;
use reqwest::{Client, Method, header};
use std::time::{Duration, Instant};

pub use cached::CachedFetcher;
pub use pages::{PAGE_COUNT_HEADER, PageFetcher};

use esicache_core::request::canonicalize;
use esicache_core::{AppConfig, Error, FetchOptions, HttpMethod};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "esicache/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 64MB)
    pub max_bytes: usize,

    /// Request timeout (default: 30s)
    pub timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "esicache/0.1".to_string(), max_bytes: 64 * 1024 * 1024, timeout: Duration::from_secs(30) }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), max_bytes: config.max_bytes, timeout: config.timeout() }
    }
}

/// Response from a single network call.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// The URL that was requested
    pub url: String,
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: header::HeaderMap,
    /// Response body bytes
    pub body: Bytes,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Header value as text, if present and valid ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body decoded as UTF-8.
    pub fn text(&self) -> Result<String, Error> {
        String::from_utf8(self.body.to_vec()).map_err(|e| Error::malformed(&self.url, e))
    }
}

/// A network call: method, headers and body come from `options`.
#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, url: &str, options: &FetchOptions) -> Result<RawResponse, Error>;
}

/// reqwest-backed [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl HttpTransport for FetchClient {
    async fn send(&self, url_str: &str, options: &FetchOptions) -> Result<RawResponse, Error> {
        let start = Instant::now();
        let url = canonicalize(url_str).map_err(|e| Error::InvalidUrl(format!("{url_str}: {e}")))?;

        let mut request = self.http.request(to_reqwest_method(options.method), url.as_str());
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(payload) = &options.payload {
            request = request.body(payload.clone());
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Network(format!("timeout fetching {url}"))
            } else {
                Error::Network(format!("{url}: {e}"))
            }
        })?;

        let status = response.status().as_u16();

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{url}: {len} bytes exceeds {}", self.config.max_bytes)));
        }

        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response from {url}: {e}")))?;

        if body.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!(
                "{url}: {} bytes exceeds {}",
                body.len(),
                self.config.max_bytes
            )));
        }

        tracing::debug!(
            "{} {} -> {} in {}ms ({} bytes)",
            options.method,
            url,
            status,
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(RawResponse { url: url.to_string(), status, headers, body })
    }
}
