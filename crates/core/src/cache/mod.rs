//! Digest-keyed, chunked cache.
//!
//! This module provides:
//!
//! - SHA-256 cache keys derived from request descriptors
//! - Three isolated namespaces ([`CacheScope`])
//! - Two size-bounded backends: in-process ([`MemoryCache`]) and SQLite ([`CacheDb`])
//! - Chunked storage with a manifest record ([`ChunkedCache`])

pub mod backend;
pub mod chunked;
pub mod connection;
pub mod entries;
pub mod hash;
pub mod memory;
pub mod migrations;
pub mod scope;

pub use crate::Error;

pub use backend::{CacheBackend, DEFAULT_MAX_VALUE_BYTES, DEFAULT_TTL};
pub use chunked::{ChunkManifest, ChunkedCache, DEFAULT_CHUNK_SIZE};
pub use connection::CacheDb;
pub use memory::MemoryCache;
pub use scope::CacheScope;
