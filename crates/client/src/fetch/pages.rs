//! Paginated JSON array fetching.
//!
//! ESI paginates list endpoints with a `page` query parameter and reports the
//! total page count in the `x-pages` response header. Pages are requested one
//! at a time, in order, and their arrays concatenated. Any failing page fails
//! the whole fetch; partial results are never returned.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{HttpTransport, RawResponse};
use esicache_core::config::PAGE_CAP;
use esicache_core::{Error, FetchOptions};

/// Response header carrying the total number of pages.
pub const PAGE_COUNT_HEADER: &str = "x-pages";

/// Total page count reported by a response; absent or unparsable means one page.
fn page_count(response: &RawResponse) -> u64 {
    response
        .header(PAGE_COUNT_HEADER)
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(1)
        .max(1)
}

/// Fetches every page of a paginated resource.
#[derive(Clone)]
pub struct PageFetcher {
    transport: Arc<dyn HttpTransport>,
    max_pages: u32,
}

impl PageFetcher {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport, max_pages: PAGE_CAP }
    }

    /// Refuse resources reporting more than `max_pages` pages.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Fetch `{base_url}1`, `{base_url}2`, ... and concatenate the JSON arrays.
    ///
    /// `base_url` must end where the page number goes, e.g. `...orders/?page=`.
    ///
    /// # Errors
    ///
    /// - `HttpStatus` if any page answers with a status other than 200
    /// - `MalformedResponse` if any body is not a JSON array
    /// - `PageLimitExceeded` if the page count is above the configured cap
    pub async fn fetch_all_pages(&self, base_url: &str, options: &FetchOptions) -> Result<Vec<Value>, Error> {
        let mut items = Vec::new();
        let mut page: u64 = 1;

        loop {
            let url = format!("{base_url}{page}");
            let response = self.transport.send(&url, options).await?;

            if response.status != 200 {
                return Err(Error::HttpStatus { url, options: options.clone(), status: response.status });
            }

            let total = page_count(&response);
            if total > u64::from(self.max_pages) {
                return Err(Error::PageLimitExceeded { url, pages: total, limit: self.max_pages });
            }

            let body: Value = serde_json::from_slice(&response.body).map_err(|e| Error::malformed(&url, e))?;
            let Value::Array(page_items) = body else {
                return Err(Error::malformed(&url, "expected a JSON array"));
            };

            tracing::debug!(page, total, items = page_items.len(), "fetched page of {}", base_url);
            items.extend(page_items);

            if page >= total {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    /// Like [`PageFetcher::fetch_all_pages`], deserializing every element into `T`.
    pub async fn fetch_all_pages_as<T: DeserializeOwned>(
        &self,
        base_url: &str,
        options: &FetchOptions,
    ) -> Result<Vec<T>, Error> {
        self.fetch_all_pages(base_url, options)
            .await?
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(|e| Error::malformed(base_url, e)))
            .collect()
    }
}
