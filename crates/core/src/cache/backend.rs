//! Bounded key/value cache backend abstraction.

use std::sync::Arc;
use std::time::Duration;

use super::scope::CacheScope;
use crate::Error;

/// Largest value a backend accepts per key unless configured otherwise.
pub const DEFAULT_MAX_VALUE_BYTES: usize = 100_000;

/// Time-to-live applied to every entry of a freshly written set.
pub const DEFAULT_TTL: Duration = Duration::from_secs(21_600);

/// A size-bounded, TTL-expiring key/value store with three isolated scopes.
///
/// Implementations must be safe for concurrent readers and writers.
#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    /// Fetch the value stored under an exact key, or `None` when absent or expired.
    async fn get(&self, scope: CacheScope, key: &str) -> Result<Option<Vec<u8>>, Error>;

    /// Store every entry with the same TTL, replacing existing values.
    ///
    /// A batch containing any entry above [`CacheBackend::max_value_bytes`] is
    /// rejected before anything is written.
    async fn put_all(&self, scope: CacheScope, entries: Vec<(String, Vec<u8>)>, ttl: Duration) -> Result<(), Error>;

    /// Maximum accepted size of a single value in bytes.
    fn max_value_bytes(&self) -> usize;
}

#[async_trait::async_trait]
impl<B: CacheBackend + ?Sized> CacheBackend for Arc<B> {
    async fn get(&self, scope: CacheScope, key: &str) -> Result<Option<Vec<u8>>, Error> {
        (**self).get(scope, key).await
    }

    async fn put_all(&self, scope: CacheScope, entries: Vec<(String, Vec<u8>)>, ttl: Duration) -> Result<(), Error> {
        (**self).put_all(scope, entries, ttl).await
    }

    fn max_value_bytes(&self) -> usize {
        (**self).max_value_bytes()
    }
}

/// Reject a batch whose largest value exceeds `max_bytes`.
pub fn check_value_sizes(entries: &[(String, Vec<u8>)], max_bytes: usize) -> Result<(), Error> {
    match entries.iter().find(|(_, value)| value.len() > max_bytes) {
        Some((key, value)) => Err(Error::CacheWrite(format!(
            "value for {key} is {} bytes, limit is {max_bytes}",
            value.len()
        ))),
        None => Ok(()),
    }
}
