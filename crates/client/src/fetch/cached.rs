//! Single-resource fetches behind the chunked cache.
//!
//! Flow for `fetch(url, options, scope)`:
//!
//! 1. Key = SHA-256 of canonical URL + options
//! 2. Reassemble `key_0..key_{n-1}` using the `key_meta` manifest
//! 3. On a complete set, return it without touching the network
//! 4. Otherwise sleep a random delay in `[0, jitter_max)`, fetch, and refuse
//!    non-success statuses
//! 5. Replace the chunk set and return the body
//!
//! The cache is an optimization only: read failures count as misses and
//! write failures are logged, never returned. [`CachedFetcher::fetch_direct`]
//! skips the cache and the delay altogether.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::de::DeserializeOwned;

use super::HttpTransport;
use esicache_core::cache::hash::compute_cache_key;
use esicache_core::{CacheScope, ChunkedCache, Error, FetchOptions};

/// Default upper bound of the pre-request delay.
pub const DEFAULT_JITTER_MAX: Duration = Duration::from_millis(5_000);

/// Uniform random delay in `[0, max)`; zero when `max` is under a millisecond.
fn jitter_delay(max: Duration) -> Duration {
    let max_ms = u64::try_from(max.as_millis()).unwrap_or(u64::MAX);
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..max_ms))
}

/// Cache-first fetcher for single (non-paginated) resources.
#[derive(Clone)]
pub struct CachedFetcher {
    transport: Arc<dyn HttpTransport>,
    cache: ChunkedCache,
    jitter_max: Duration,
}

impl CachedFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, cache: ChunkedCache) -> Self {
        Self { transport, cache, jitter_max: DEFAULT_JITTER_MAX }
    }

    /// Set the upper bound of the pre-request delay. Zero disables it.
    pub fn with_jitter(mut self, jitter_max: Duration) -> Self {
        self.jitter_max = jitter_max;
        self
    }

    pub fn cache(&self) -> &ChunkedCache {
        &self.cache
    }

    /// Return the body for `url`, from cache when a complete entry set exists.
    ///
    /// # Errors
    ///
    /// - `HttpStatus` for a non-success response (nothing is cached)
    /// - `Network`, `InvalidUrl`, `FetchTooLarge` from the transport
    /// - `MalformedResponse` if the body is not UTF-8
    pub async fn fetch(&self, url: &str, options: &FetchOptions, scope: CacheScope) -> Result<String, Error> {
        let key = compute_cache_key(url, options);

        match self.cache.load(scope, &key).await {
            Ok(Some(bytes)) => match String::from_utf8(bytes) {
                Ok(body) => {
                    tracing::debug!(%scope, key = %key, bytes = body.len(), "cache hit for {}", url);
                    return Ok(body);
                }
                Err(e) => tracing::warn!(%scope, key = %key, error = %e, "cached body is not UTF-8, refetching"),
            },
            Ok(None) => tracing::debug!(%scope, key = %key, "cache miss for {}", url),
            Err(e) => tracing::warn!(%scope, key = %key, error = %e, "cache read failed, fetching from network"),
        }

        let delay = jitter_delay(self.jitter_max);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let body = self.fetch_direct(url, options).await?;

        match self.cache.store(scope, &key, body.as_bytes()).await {
            Ok(manifest) => tracing::debug!(%scope, key = %key, chunks = manifest.chunks, "cached {}", url),
            Err(e) => tracing::warn!(%scope, key = %key, error = %e, "cache write failed for {}", url),
        }

        Ok(body)
    }

    /// One network request, no cache lookup, no cache write and no delay.
    ///
    /// # Errors
    ///
    /// Same as [`CachedFetcher::fetch`].
    pub async fn fetch_direct(&self, url: &str, options: &FetchOptions) -> Result<String, Error> {
        let response = self.transport.send(url, options).await?;
        if !response.is_success() {
            return Err(Error::HttpStatus { url: url.to_string(), options: options.clone(), status: response.status });
        }
        response.text()
    }

    /// [`CachedFetcher::fetch_direct`] followed by JSON deserialization.
    pub async fn fetch_direct_json<T: DeserializeOwned>(&self, url: &str, options: &FetchOptions) -> Result<T, Error> {
        let body = self.fetch_direct(url, options).await?;
        serde_json::from_str(&body).map_err(|e| Error::malformed(url, e))
    }

    /// [`CachedFetcher::fetch`] followed by JSON deserialization.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        options: &FetchOptions,
        scope: CacheScope,
    ) -> Result<T, Error> {
        let body = self.fetch(url, options, scope).await?;
        serde_json::from_str(&body).map_err(|e| Error::malformed(url, e))
    }
}
