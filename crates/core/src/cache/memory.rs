//! Process-local cache backend.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use super::backend::{CacheBackend, DEFAULT_MAX_VALUE_BYTES, check_value_sizes};
use super::scope::CacheScope;
use crate::Error;

#[derive(Debug)]
struct StoredValue {
    bytes: Vec<u8>,
    expires_at: Instant,
}

/// In-memory cache with per-entry expiry.
///
/// Expired values are invisible to `get`. They are dropped by
/// [`MemoryCache::purge_expired`] and swept on every `put_all`, so a long-lived
/// cache only holds what is still live plus the latest batch.
#[derive(Debug)]
pub struct MemoryCache {
    entries: RwLock<HashMap<(CacheScope, String), StoredValue>>,
    max_value_bytes: usize,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_VALUE_BYTES)
    }
}

impl MemoryCache {
    pub fn new(max_value_bytes: usize) -> Self {
        Self { entries: RwLock::new(HashMap::new()), max_value_bytes }
    }

    /// Drop every expired value. Returns the number removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, value| value.expires_at > now);
        before - entries.len()
    }

    /// Remove a single key, expired or not.
    pub async fn remove(&self, scope: CacheScope, key: &str) -> bool {
        self.entries.write().await.remove(&(scope, key.to_string())).is_some()
    }

    /// Number of live values in a scope.
    pub async fn len(&self, scope: CacheScope) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .iter()
            .filter(|((s, _), value)| *s == scope && value.expires_at > now)
            .count()
    }
}

#[async_trait::async_trait]
impl CacheBackend for MemoryCache {
    async fn get(&self, scope: CacheScope, key: &str) -> Result<Option<Vec<u8>>, Error> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&(scope, key.to_string()))
            .filter(|value| value.expires_at > Instant::now())
            .map(|value| value.bytes.clone()))
    }

    async fn put_all(&self, scope: CacheScope, entries: Vec<(String, Vec<u8>)>, ttl: Duration) -> Result<(), Error> {
        check_value_sizes(&entries, self.max_value_bytes)?;

        let now = Instant::now();
        let expires_at = now + ttl;
        let mut stored = self.entries.write().await;
        stored.retain(|_, value| value.expires_at > now);
        for (key, bytes) in entries {
            stored.insert((scope, key), StoredValue { bytes, expires_at });
        }
        Ok(())
    }

    fn max_value_bytes(&self) -> usize {
        self.max_value_bytes
    }
}
