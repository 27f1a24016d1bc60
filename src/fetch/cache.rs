//! HTTP response cache
//!
//! Fetchers are pure functions of their arguments, so responses are safe to
//! memoize. The cache is an explicit collaborator injected into the
//! [`Fetcher`](crate::fetch::Fetcher): entries are keyed by a digest of
//! method + URL + credential fingerprint, carry the status and body, and
//! expire after a configurable TTL. Backed either by memory or by SQLite.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;

use crate::Result;

/// A memoized HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    /// HTTP status code (2xx or 404; other statuses are never cached)
    pub status: u16,

    /// Response body
    pub body: String,

    /// Unix timestamp of the original fetch
    pub fetched_at: i64,
}

/// Storage backend for cached responses
pub trait ResponseStore: Send {
    /// Looks up an entry by key
    fn get(&self, key: &str) -> Result<Option<CachedResponse>>;

    /// Inserts or replaces an entry
    fn put(&mut self, key: &str, response: &CachedResponse) -> Result<()>;
}

/// In-memory store, used when no cache file is configured
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, CachedResponse>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResponseStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<CachedResponse>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, response: &CachedResponse) -> Result<()> {
        self.entries.insert(key.to_string(), response.clone());
        Ok(())
    }
}

/// SQLite-backed store, survives across batch runs
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the cache database at the given path
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS responses (
                key        TEXT PRIMARY KEY,
                status     INTEGER NOT NULL,
                body       TEXT NOT NULL,
                fetched_at INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS responses (
                key        TEXT PRIMARY KEY,
                status     INTEGER NOT NULL,
                body       TEXT NOT NULL,
                fetched_at INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn })
    }
}

impl ResponseStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<CachedResponse>> {
        let mut stmt = self
            .conn
            .prepare("SELECT status, body, fetched_at FROM responses WHERE key = ?1")?;

        let entry = stmt
            .query_row(params![key], |row| {
                Ok(CachedResponse {
                    status: row.get::<_, i64>(0)? as u16,
                    body: row.get(1)?,
                    fetched_at: row.get(2)?,
                })
            })
            .optional()?;

        Ok(entry)
    }

    fn put(&mut self, key: &str, response: &CachedResponse) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO responses (key, status, body, fetched_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                key,
                response.status as i64,
                response.body,
                response.fetched_at
            ],
        )?;
        Ok(())
    }
}

/// Computes the cache key for a request
///
/// The key is a SHA-256 digest over method, URL and a fingerprint of the
/// credential-bearing headers, so authorized and anonymous fetches of the
/// same URL never collide.
pub fn cache_key(method: &str, url: &str, auth_fingerprint: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hasher.update(b"\n");
    hasher.update(auth_fingerprint.as_bytes());
    hex::encode(hasher.finalize())
}

/// TTL-aware cache facade over a [`ResponseStore`]
pub struct ResponseCache {
    store: Box<dyn ResponseStore>,
    ttl_secs: i64,
    bypass_reads: bool,
}

impl ResponseCache {
    /// Creates a cache over the given store with a TTL in hours
    pub fn new(store: Box<dyn ResponseStore>, ttl_hours: i64) -> Self {
        Self {
            store,
            ttl_secs: ttl_hours * 3600,
            bypass_reads: false,
        }
    }

    /// Skip cache reads (still records fresh responses); used by `--fresh`
    pub fn bypass_reads(mut self, bypass: bool) -> Self {
        self.bypass_reads = bypass;
        self
    }

    /// Returns a cached response if present and not expired
    pub fn lookup(&self, key: &str) -> Result<Option<CachedResponse>> {
        if self.bypass_reads {
            return Ok(None);
        }
        let Some(entry) = self.store.get(key)? else {
            return Ok(None);
        };
        if Utc::now().timestamp() - entry.fetched_at > self.ttl_secs {
            return Ok(None);
        }
        Ok(Some(entry))
    }

    /// Records a response under the given key
    pub fn record(&mut self, key: &str, status: u16, body: &str) -> Result<()> {
        let entry = CachedResponse {
            status,
            body: body.to_string(),
            fetched_at: Utc::now().timestamp(),
        };
        self.store.put(key, &entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_stable() {
        let a = cache_key("GET", "https://example.com/page", "");
        let b = cache_key("GET", "https://example.com/page", "");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_cache_key_varies_with_auth() {
        let anon = cache_key("GET", "https://example.com/page", "");
        let auth = cache_key("GET", "https://example.com/page", "tokenhash");
        assert_ne!(anon, auth);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        let entry = CachedResponse {
            status: 200,
            body: "hello".to_string(),
            fetched_at: Utc::now().timestamp(),
        };
        store.put("k", &entry).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(entry));
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn test_sqlite_store_roundtrip() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        let entry = CachedResponse {
            status: 404,
            body: String::new(),
            fetched_at: 1_700_000_000,
        };
        store.put("k", &entry).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(entry));
    }

    #[test]
    fn test_sqlite_store_replaces_entry() {
        let mut store = SqliteStore::new_in_memory().unwrap();
        let first = CachedResponse {
            status: 200,
            body: "old".to_string(),
            fetched_at: 1,
        };
        let second = CachedResponse {
            status: 200,
            body: "new".to_string(),
            fetched_at: 2,
        };
        store.put("k", &first).unwrap();
        store.put("k", &second).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(second));
    }

    #[test]
    fn test_lookup_respects_ttl() {
        let mut store = MemoryStore::new();
        let stale = CachedResponse {
            status: 200,
            body: "stale".to_string(),
            fetched_at: Utc::now().timestamp() - 7200,
        };
        store.put("k", &stale).unwrap();

        let cache = ResponseCache::new(Box::new(store), 1);
        assert_eq!(cache.lookup("k").unwrap(), None);
    }

    #[test]
    fn test_lookup_returns_fresh_entry() {
        let mut cache = ResponseCache::new(Box::new(MemoryStore::new()), 24);
        cache.record("k", 200, "body").unwrap();

        let hit = cache.lookup("k").unwrap().unwrap();
        assert_eq!(hit.status, 200);
        assert_eq!(hit.body, "body");
    }

    #[test]
    fn test_bypass_reads_skips_lookup_but_records() {
        let mut cache = ResponseCache::new(Box::new(MemoryStore::new()), 24).bypass_reads(true);
        cache.record("k", 200, "body").unwrap();
        assert_eq!(cache.lookup("k").unwrap(), None);
    }
}
