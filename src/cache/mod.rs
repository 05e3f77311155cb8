//! Bookstore cache system
//!
//! Query results are stored as JSON under string keys in a key-value store:
//!
//! - **Redis** when `cache.redis_url` is configured
//! - **in-memory LRU** otherwise
//!
//! Reads go through [`QueryCache`]; writes evict the entries they may have made
//! stale. See [`keys`] for the key format.
//!
//! ## Configuration
//!
//! ```toml
//! [cache]
//! enabled = true
//! redis_url = "redis://127.0.0.1:6379"
//! ttl_seconds = 0
//! memory_capacity = 1024
//! ```

mod config;
mod error;
pub mod keys;
mod lock;
mod query;
mod redis;
mod store;

use std::sync::Arc;

use tracing::info;

pub use config::CacheConfig;
pub use error::{CacheError, CacheResult};
pub use keys::{CacheKey, CacheName};
pub use query::QueryCache;
pub(crate) use query::{METRIC_CACHE_ERROR, METRIC_CACHE_EVICT, METRIC_CACHE_HIT, METRIC_CACHE_MISS};
pub use self::redis::RedisCacheStore;
pub use store::{CacheStore, MemoryCacheStore};

/// Build the query cache described by `config`.
pub async fn connect(config: &CacheConfig) -> CacheResult<QueryCache> {
    if !config.enabled {
        info!(backend = "disabled", "cache disabled; every read hits the store");
        return Ok(QueryCache::disabled());
    }

    let store: Arc<dyn CacheStore> = match config.redis_url.as_deref() {
        Some(url) => {
            let store = RedisCacheStore::connect(url, config).await?;
            store.ping().await?;
            info!(backend = "redis", ttl_seconds = config.ttl_seconds, "cache connected");
            Arc::new(store)
        }
        None => {
            info!(
                backend = "memory",
                capacity = config.memory_capacity,
                ttl_seconds = config.ttl_seconds,
                "cache ready"
            );
            Arc::new(MemoryCacheStore::new(config))
        }
    };

    Ok(QueryCache::new(store))
}
