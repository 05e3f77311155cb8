//! Redis-backed cache store.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tracing::debug;

use super::config::CacheConfig;
use super::error::{CacheError, CacheResult};
use super::store::CacheStore;

const SCAN_BATCH: usize = 200;

/// Cache store over a single multiplexed Redis connection.
///
/// Keys are written verbatim unless a prefix is configured, in which case they
/// become `<prefix>:<key>`.
pub struct RedisCacheStore {
    connection: MultiplexedConnection,
    prefix: Option<String>,
    ttl_seconds: u64,
}

impl RedisCacheStore {
    pub async fn connect(url: &str, config: &CacheConfig) -> CacheResult<Self> {
        let client =
            redis::Client::open(url).map_err(|err| CacheError::Connection(err.to_string()))?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|err| CacheError::Connection(err.to_string()))?;

        Ok(Self {
            connection,
            prefix: config.key_prefix.clone().filter(|prefix| !prefix.is_empty()),
            ttl_seconds: config.ttl_seconds,
        })
    }

    fn key(&self, key: &str) -> String {
        match self.prefix.as_deref() {
            Some(prefix) => format!("{prefix}:{key}"),
            None => key.to_string(),
        }
    }

    pub async fn ping(&self) -> CacheResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(backend)?;
        Ok(())
    }
}

fn backend(err: redis::RedisError) -> CacheError {
    CacheError::Backend(err.to_string())
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection.clone();
        let value: Option<String> = redis::cmd("GET")
            .arg(self.key(key))
            .query_async(&mut conn)
            .await
            .map_err(backend)?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: String) -> CacheResult<()> {
        let mut conn = self.connection.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(self.key(key)).arg(value);
        if self.ttl_seconds > 0 {
            cmd.arg("EX").arg(self.ttl_seconds);
        }
        let _: () = cmd.query_async(&mut conn).await.map_err(backend)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.connection.clone();
        let removed: u64 = redis::cmd("DEL")
            .arg(self.key(key))
            .query_async(&mut conn)
            .await
            .map_err(backend)?;
        Ok(removed > 0)
    }

    async fn delete_pattern(&self, pattern: &str) -> CacheResult<u64> {
        let mut conn = self.connection.clone();
        let full_pattern = self.key(pattern);

        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&full_pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(backend)?;

            if !keys.is_empty() {
                let removed: u64 = redis::cmd("DEL")
                    .arg(&keys)
                    .query_async(&mut conn)
                    .await
                    .map_err(backend)?;
                deleted += removed;
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!(pattern, deleted, "redis cache delete pattern");
        Ok(deleted)
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.connection.clone();
        let count: u64 = redis::cmd("EXISTS")
            .arg(self.key(key))
            .query_async(&mut conn)
            .await
            .map_err(backend)?;
        Ok(count > 0)
    }
}
