//! Network side of esicache.
//!
//! This crate provides the HTTP transport, the paginated and cached fetch
//! strategies, the SDE reference loader and typed ESI wrappers.

pub mod esi;
pub mod fetch;
pub mod sde;

pub use esi::{EsiClient, MarketHistoryDay, MarketOrder, MarketPrice, OrderType, UniverseName};
pub use fetch::{CachedFetcher, FetchClient, FetchConfig, HttpTransport, PageFetcher, RawResponse};
pub use sde::SdeLoader;
