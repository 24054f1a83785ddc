//! Chunked storage of values larger than a backend's per-key ceiling.
//!
//! A value stored under key `K` becomes:
//!
//! - `K_0`, `K_1`, ... `K_{n-1}`: consecutive slices of at most `chunk_size` bytes
//! - `K_meta`: a JSON [`ChunkManifest`] with the chunk count and total length
//!
//! The manifest is the last entry of the batch and carries the SHA-256 of the
//! whole body. A read that finds no manifest, a missing chunk, a length
//! mismatch or a digest mismatch reports a miss, so a partially expired,
//! partially written or concurrently replaced set is never returned.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::backend::{CacheBackend, DEFAULT_MAX_VALUE_BYTES, DEFAULT_TTL};
use super::hash::{chunk_key, content_digest, manifest_key};
use super::scope::CacheScope;
use crate::Error;

/// Default chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = DEFAULT_MAX_VALUE_BYTES;

/// Describes a complete chunk set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkManifest {
    pub chunks: usize,
    pub bytes: usize,
    /// Hex SHA-256 of the reassembled body. Manifests without one never match.
    #[serde(default)]
    pub digest: String,
}

impl ChunkManifest {
    pub fn for_body(body: &[u8], chunks: usize) -> Self {
        Self { chunks, bytes: body.len(), digest: content_digest(body) }
    }
}

/// Split `body` into slices of at most `chunk_size` bytes. Empty input yields no slices.
pub fn split_chunks(body: &[u8], chunk_size: usize) -> Vec<&[u8]> {
    body.chunks(chunk_size.max(1)).collect()
}

/// Build the full batch (chunks, then manifest) for `body` under `key`.
pub fn chunk_entries(key: &str, body: &[u8], chunk_size: usize) -> Result<Vec<(String, Vec<u8>)>, Error> {
    let chunks = split_chunks(body, chunk_size);
    let manifest = ChunkManifest::for_body(body, chunks.len());

    let mut entries: Vec<(String, Vec<u8>)> = chunks
        .into_iter()
        .enumerate()
        .map(|(sequence, chunk)| (chunk_key(key, sequence), chunk.to_vec()))
        .collect();

    let manifest_bytes = serde_json::to_vec(&manifest).map_err(|e| Error::CacheWrite(e.to_string()))?;
    entries.push((manifest_key(key), manifest_bytes));

    Ok(entries)
}

/// Chunk-aware view over a [`CacheBackend`].
#[derive(Clone)]
pub struct ChunkedCache {
    backend: Arc<dyn CacheBackend>,
    chunk_size: usize,
    ttl: Duration,
}

impl std::fmt::Debug for ChunkedCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkedCache")
            .field("chunk_size", &self.chunk_size)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl ChunkedCache {
    /// Wrap a backend using the default chunk size (capped to the backend's ceiling) and TTL.
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        let chunk_size = DEFAULT_CHUNK_SIZE.min(backend.max_value_bytes()).max(1);
        Self { backend, chunk_size, ttl: DEFAULT_TTL }
    }

    /// Override the chunk size; it is still capped to the backend's ceiling.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.min(self.backend.max_value_bytes()).max(1);
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Reassemble the value stored under `key`, or `None` if the set is incomplete.
    pub async fn load(&self, scope: CacheScope, key: &str) -> Result<Option<Vec<u8>>, Error> {
        let Some(raw_manifest) = self.backend.get(scope, &manifest_key(key)).await? else {
            return Ok(None);
        };

        let manifest: ChunkManifest = match serde_json::from_slice(&raw_manifest) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!(key, error = %e, "unreadable chunk manifest, treating as miss");
                return Ok(None);
            }
        };

        let mut body = Vec::with_capacity(manifest.bytes);
        for sequence in 0..manifest.chunks {
            match self.backend.get(scope, &chunk_key(key, sequence)).await? {
                Some(chunk) => body.extend_from_slice(&chunk),
                None => {
                    tracing::debug!(key, sequence, chunks = manifest.chunks, "chunk missing, treating as miss");
                    return Ok(None);
                }
            }
        }

        if body.len() != manifest.bytes {
            tracing::warn!(key, expected = manifest.bytes, actual = body.len(), "chunk set length mismatch");
            return Ok(None);
        }

        if content_digest(&body) != manifest.digest {
            tracing::debug!(key, chunks = manifest.chunks, "chunk set changed during read, treating as miss");
            return Ok(None);
        }

        Ok(Some(body))
    }

    /// Replace the chunk set for `key` with `body`.
    pub async fn store(&self, scope: CacheScope, key: &str, body: &[u8]) -> Result<ChunkManifest, Error> {
        let entries = chunk_entries(key, body, self.chunk_size)?;
        let manifest = ChunkManifest::for_body(body, entries.len().saturating_sub(1));
        self.backend.put_all(scope, entries, self.ttl).await?;
        Ok(manifest)
    }
}
