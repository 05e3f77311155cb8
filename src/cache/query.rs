//! Typed, best-effort access to the cache store.
//!
//! The store is an optimisation: every failure here is logged and swallowed so
//! that a cache outage degrades to direct store reads instead of failed
//! requests.

use std::sync::Arc;

use metrics::counter;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::keys::{CacheKey, CacheName};
use super::store::CacheStore;

pub(crate) const METRIC_CACHE_HIT: &str = "bookstore_cache_hit_total";
pub(crate) const METRIC_CACHE_MISS: &str = "bookstore_cache_miss_total";
pub(crate) const METRIC_CACHE_EVICT: &str = "bookstore_cache_evict_total";
pub(crate) const METRIC_CACHE_ERROR: &str = "bookstore_cache_error_total";

#[derive(Clone)]
pub struct QueryCache {
    store: Option<Arc<dyn CacheStore>>,
}

impl QueryCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store: Some(store) }
    }

    /// A cache that never holds anything; reads always miss.
    pub fn disabled() -> Self {
        Self { store: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    pub fn store(&self) -> Option<&Arc<dyn CacheStore>> {
        self.store.as_ref()
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let store = self.store.as_ref()?;
        let cache = key.name().as_str();

        let raw = match store.get(key.as_str()).await {
            Ok(raw) => raw,
            Err(err) => {
                counter!(METRIC_CACHE_ERROR, "cache" => cache, "op" => "get").increment(1);
                warn!(key = %key, error = %err, "cache read failed, falling back to store");
                return None;
            }
        };

        let Some(raw) = raw else {
            counter!(METRIC_CACHE_MISS, "cache" => cache).increment(1);
            debug!(key = %key, "cache miss");
            return None;
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                counter!(METRIC_CACHE_HIT, "cache" => cache).increment(1);
                debug!(key = %key, "cache hit");
                Some(value)
            }
            Err(err) => {
                counter!(METRIC_CACHE_ERROR, "cache" => cache, "op" => "decode").increment(1);
                warn!(key = %key, error = %err, "discarding undecodable cache entry");
                self.evict(key).await;
                None
            }
        }
    }

    pub async fn put<T: Serialize + ?Sized>(&self, key: &CacheKey, value: &T) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let cache = key.name().as_str();

        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                counter!(METRIC_CACHE_ERROR, "cache" => cache, "op" => "encode").increment(1);
                warn!(key = %key, error = %err, "cache value could not be serialized");
                return;
            }
        };

        if let Err(err) = store.put(key.as_str(), raw).await {
            counter!(METRIC_CACHE_ERROR, "cache" => cache, "op" => "put").increment(1);
            warn!(key = %key, error = %err, "cache write failed");
        }
    }

    pub async fn evict(&self, key: &CacheKey) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let cache = key.name().as_str();

        match store.delete(key.as_str()).await {
            Ok(removed) => {
                if removed {
                    counter!(METRIC_CACHE_EVICT, "cache" => cache).increment(1);
                }
                debug!(key = %key, removed, "cache evict");
            }
            Err(err) => {
                counter!(METRIC_CACHE_ERROR, "cache" => cache, "op" => "evict").increment(1);
                warn!(key = %key, error = %err, "cache eviction failed, entry may be stale");
            }
        }
    }

    /// Drop every entry of the named caches. Returns how many were removed.
    pub async fn clear(&self, names: &[CacheName]) -> u64 {
        let Some(store) = self.store.as_ref() else {
            return 0;
        };

        let mut removed = 0;
        for name in names {
            let pattern = CacheKey::pattern_for(*name);
            match store.delete_pattern(&pattern).await {
                Ok(count) => removed += count,
                Err(err) => {
                    counter!(METRIC_CACHE_ERROR, "cache" => name.as_str(), "op" => "clear")
                        .increment(1);
                    warn!(pattern = %pattern, error = %err, "cache clear failed");
                }
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde::Deserialize;

    use super::*;
    use crate::cache::{CacheConfig, CacheError, CacheResult, MemoryCacheStore};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        value: u32,
    }

    struct FailingStore;

    #[async_trait]
    impl CacheStore for FailingStore {
        async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
            Err(CacheError::Connection("refused".to_string()))
        }

        async fn put(&self, _key: &str, _value: String) -> CacheResult<()> {
            Err(CacheError::Connection("refused".to_string()))
        }

        async fn delete(&self, _key: &str) -> CacheResult<bool> {
            Err(CacheError::Connection("refused".to_string()))
        }

        async fn delete_pattern(&self, _pattern: &str) -> CacheResult<u64> {
            Err(CacheError::Connection("refused".to_string()))
        }

        async fn exists(&self, _key: &str) -> CacheResult<bool> {
            Err(CacheError::Connection("refused".to_string()))
        }
    }

    fn memory_cache() -> (QueryCache, Arc<MemoryCacheStore>) {
        let store = Arc::new(MemoryCacheStore::new(&CacheConfig::default()));
        (QueryCache::new(store.clone()), store)
    }

    #[tokio::test]
    async fn put_then_get_returns_value() {
        let (cache, _) = memory_cache();
        let key = CacheKey::book(1);

        cache.put(&key, &Sample { value: 7 }).await;

        assert_eq!(cache.get::<Sample>(&key).await, Some(Sample { value: 7 }));
    }

    #[tokio::test]
    async fn undecodable_entry_is_dropped() {
        let (cache, store) = memory_cache();
        let key = CacheKey::book(1);
        store.put(key.as_str(), "not json".to_string()).await.unwrap();

        assert!(cache.get::<Sample>(&key).await.is_none());
        assert!(!store.exists(key.as_str()).await.unwrap());
    }

    #[tokio::test]
    async fn store_failures_degrade_to_misses() {
        let cache = QueryCache::new(Arc::new(FailingStore));
        let key = CacheKey::books("music");

        cache.put(&key, &Sample { value: 1 }).await;
        cache.evict(&key).await;
        assert!(cache.get::<Sample>(&key).await.is_none());
        assert_eq!(cache.clear(&CacheName::ALL).await, 0);
    }

    #[tokio::test]
    async fn disabled_cache_never_hits() {
        let cache = QueryCache::disabled();
        let key = CacheKey::book(1);

        cache.put(&key, &Sample { value: 1 }).await;

        assert!(!cache.is_enabled());
        assert!(cache.get::<Sample>(&key).await.is_none());
    }

    #[tokio::test]
    async fn clear_removes_only_named_caches() {
        let (cache, store) = memory_cache();
        cache.put(&CacheKey::books("music"), &Vec::<u32>::new()).await;
        cache.put(&CacheKey::book(3), &Sample { value: 3 }).await;

        let removed = cache.clear(&[CacheName::Books]).await;

        assert_eq!(removed, 1);
        assert!(store.exists("book::3").await.unwrap());
    }
}
