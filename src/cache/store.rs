//! Key-value storage backends for serialized query results.

use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use lru::LruCache;
use tracing::debug;

use super::config::CacheConfig;
use super::error::CacheResult;
use super::keys::pattern_matcher;
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

/// Capabilities the catalog needs from a key-value cache.
///
/// Values are opaque strings; typed access lives in [`super::QueryCache`].
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    async fn put(&self, key: &str, value: String) -> CacheResult<()>;

    /// Remove `key`, returning whether it was present.
    async fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Remove every key matching a Redis-style glob, returning the count.
    async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64>;

    async fn exists(&self, key: &str) -> CacheResult<bool>;
}

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// In-process LRU store used when no Redis endpoint is configured.
pub struct MemoryCacheStore {
    entries: RwLock<LruCache<String, Entry>>,
    ttl: Option<Duration>,
}

impl MemoryCacheStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.memory_capacity_non_zero())),
            ttl: config.ttl(),
        }
    }

    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn keys(&self) -> Vec<String> {
        rw_read(&self.entries, SOURCE, "keys")
            .iter()
            .map(|(key, _)| key.clone())
            .collect()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut entries = rw_write(&self.entries, SOURCE, "get");
        match entries.get(key) {
            Some(entry) if !entry.is_expired(Instant::now()) => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => {}
            None => return Ok(None),
        }
        entries.pop(key);
        Ok(None)
    }

    async fn put(&self, key: &str, value: String) -> CacheResult<()> {
        let entry = Entry {
            value,
            expires_at: self.ttl.map(|ttl| Instant::now() + ttl),
        };
        let displaced = rw_write(&self.entries, SOURCE, "put").push(key.to_string(), entry);
        if let Some((evicted, _)) = displaced.filter(|(displaced_key, _)| displaced_key != key) {
            debug!(evicted = %evicted, "memory cache at capacity, dropped least recent entry");
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        Ok(rw_write(&self.entries, SOURCE, "delete").pop(key).is_some())
    }

    async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let matcher = pattern_matcher(pattern)?;
        let mut entries = rw_write(&self.entries, SOURCE, "delete_pattern");
        let matching: Vec<String> = entries
            .iter()
            .filter(|(key, _)| matcher.is_match(key.as_str()))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &matching {
            entries.pop(key);
        }
        Ok(matching.len() as u64)
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let entries = rw_read(&self.entries, SOURCE, "exists");
        Ok(entries
            .peek(key)
            .is_some_and(|entry| !entry.is_expired(Instant::now())))
    }
}
