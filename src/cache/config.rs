//! Cache configuration.
//!
//! Built from the `[cache]` section of `bookstore.toml`.

use std::num::NonZeroUsize;
use std::time::Duration;

const DEFAULT_MEMORY_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Read through and evict at all. When false every read hits the store.
    pub enabled: bool,
    /// Redis endpoint; the in-memory backend is used when absent.
    pub redis_url: Option<String>,
    /// Namespace prepended to every Redis key as `<prefix>:`.
    pub key_prefix: Option<String>,
    /// Entry lifetime in seconds. Zero keeps entries until evicted.
    pub ttl_seconds: u64,
    /// Maximum entries held by the in-memory backend.
    pub memory_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            redis_url: None,
            key_prefix: None,
            ttl_seconds: 0,
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            redis_url: settings.redis_url.clone(),
            key_prefix: settings.key_prefix.clone(),
            ttl_seconds: settings.ttl_seconds,
            memory_capacity: settings.memory_capacity,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_seconds > 0).then(|| Duration::from_secs(self.ttl_seconds))
    }

    /// Returns the memory capacity as NonZeroUsize, clamping to 1 if zero.
    pub fn memory_capacity_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.memory_capacity).unwrap_or(NonZeroUsize::MIN)
    }
}
