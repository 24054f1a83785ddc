//! Digest-keyed cache key generation.
//!
//! Keys are the lowercase hex SHA-256 of the canonical URL, optionally
//! followed by the canonical request options. Chunk and manifest keys are
//! derived from the base key by suffix.

use sha2::{Digest, Sha256};

use crate::request::{FetchOptions, canonicalize};

/// Suffix of the manifest record that accompanies every chunk set.
pub const MANIFEST_SUFFIX: &str = "meta";

/// Compute the cache key for a bare URL.
///
/// Never fails: strings that do not parse as URLs are hashed as trimmed text.
pub fn compute_url_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_url(url).as_bytes());
    hex::encode(hasher.finalize())
}

/// Compute the cache key for a full request descriptor.
pub fn compute_cache_key(url: &str, options: &FetchOptions) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_url(url).as_bytes());
    hasher.update(b"\n");
    hasher.update(options.canonical().as_bytes());
    hex::encode(hasher.finalize())
}

/// Lowercase hex SHA-256 of a stored body, recorded in the chunk manifest.
pub fn content_digest(body: &[u8]) -> String {
    hex::encode(Sha256::digest(body))
}

/// Key of the chunk at `sequence` within the entry set for `key`.
pub fn chunk_key(key: &str, sequence: usize) -> String {
    format!("{key}_{sequence}")
}

/// Key of the manifest record for `key`.
pub fn manifest_key(key: &str) -> String {
    format!("{key}_{MANIFEST_SUFFIX}")
}

fn canonical_url(url: &str) -> String {
    match canonicalize(url) {
        Ok(parsed) => parsed.to_string(),
        Err(_) => url.trim().to_string(),
    }
}
