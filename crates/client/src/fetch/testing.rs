//! In-process doubles for fetch tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue};

use super::{HttpTransport, RawResponse};
use esicache_core::cache::{CacheBackend, CacheScope};
use esicache_core::{Error, FetchOptions};

pub(crate) fn response(status: u16, body: &str, pages: Option<&str>) -> RawResponse {
    let mut headers = HeaderMap::new();
    if let Some(pages) = pages {
        headers.insert("x-pages", HeaderValue::from_str(pages).unwrap());
    }
    RawResponse { url: String::new(), status, headers, body: Bytes::from(body.to_string()) }
}

/// Replays queued responses in order and records every requested URL.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<RawResponse>>,
    requests: Mutex<Vec<(String, FetchOptions)>>,
}

impl ScriptedTransport {
    pub(crate) fn new(responses: Vec<RawResponse>) -> Self {
        Self { responses: Mutex::new(responses.into()), requests: Mutex::new(Vec::new()) }
    }

    pub(crate) fn urls(&self) -> Vec<String> {
        self.requests.lock().unwrap().iter().map(|(url, _)| url.clone()).collect()
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn last_options(&self) -> Option<FetchOptions> {
        self.requests.lock().unwrap().last().map(|(_, options)| options.clone())
    }
}

#[async_trait::async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, url: &str, options: &FetchOptions) -> Result<RawResponse, Error> {
        self.requests.lock().unwrap().push((url.to_string(), options.clone()));
        let mut next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| Error::Network(format!("no scripted response for {url}")))?;
        next.url = url.to_string();
        Ok(next)
    }
}

/// Backend that never holds anything and refuses every write.
pub(crate) struct RejectingBackend;

#[async_trait::async_trait]
impl CacheBackend for RejectingBackend {
    async fn get(&self, _scope: CacheScope, _key: &str) -> Result<Option<Vec<u8>>, Error> {
        Ok(None)
    }

    async fn put_all(&self, _scope: CacheScope, _entries: Vec<(String, Vec<u8>)>, _ttl: Duration) -> Result<(), Error> {
        Err(Error::CacheWrite("quota exceeded".into()))
    }

    fn max_value_bytes(&self) -> usize {
        100_000
    }
}
