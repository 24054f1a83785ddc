//! Core types and shared functionality for esicache.
//!
//! This crate provides:
//! - Request descriptors and URL canonicalization
//! - Digest-keyed, chunked cache with in-memory and SQLite backends
//! - The immutable reference index used for id-to-name lookups
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod reference;
pub mod request;

pub use cache::{CacheBackend, CacheDb, CacheScope, ChunkedCache, MemoryCache};
pub use config::{AppConfig, CacheBackendKind, ConfigError};
pub use error::Error;
pub use reference::ReferenceIndex;
pub use request::{FetchOptions, HttpMethod};
