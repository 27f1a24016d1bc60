//! HTTP retrieval for all upstream sources
//!
//! This module contains:
//! - The HTTP client and the [`Fetcher`] used for every source call
//! - The injected TTL response cache and its storage backends

mod cache;
mod client;

pub use cache::{cache_key, CachedResponse, MemoryStore, ResponseCache, ResponseStore, SqliteStore};
pub use client::{build_http_client, FetchOutcome, Fetcher};
