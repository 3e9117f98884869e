//! Redis-based cache implementation.

use super::CacheInterface;
use async_trait::async_trait;
use deadpool_redis::{
    redis::{self, AsyncCommands, RedisError},
    Config, Pool, Runtime,
};
use shaku::Component;
use std::sync::Arc;
use std::time::Duration;
use strata_config::{KeyScan, RedisConfig};
use strata_core::{StrataError, StrataResult};
use tracing::{debug, info};

/// Default `COUNT` hint for `SCAN`.
pub const DEFAULT_SCAN_COUNT: u32 = 100;

/// Redis-based cache service.
///
/// With no pool it acts as a disabled cache: every read misses and every
/// write is a no-op.
#[derive(Component)]
#[shaku(interface = CacheInterface)]
pub struct RedisCacheService {
    /// Redis connection pool.
    pool: Option<Arc<Pool>>,
    /// How pattern deletes enumerate keys.
    key_scan: KeyScan,
    /// `COUNT` hint per `SCAN` round trip.
    #[shaku(default = DEFAULT_SCAN_COUNT)]
    scan_count: u32,
}

impl RedisCacheService {
    /// Create a new Redis cache service.
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self {
            pool: Some(pool),
            key_scan: KeyScan::Keys,
            scan_count: DEFAULT_SCAN_COUNT,
        }
    }

    /// Use cursor-based `SCAN` instead of `KEYS` for pattern enumeration.
    #[must_use]
    pub fn with_key_scan(mut self, key_scan: KeyScan, scan_count: u32) -> Self {
        self.key_scan = key_scan;
        self.scan_count = scan_count.max(1);
        self
    }

    /// Create a no-op cache service (for when Redis is disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            pool: None,
            key_scan: KeyScan::Keys,
            scan_count: DEFAULT_SCAN_COUNT,
        }
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> StrataResult<deadpool_redis::Connection> {
        match &self.pool {
            Some(pool) => pool
                .get()
                .await
                .map_err(|e| StrataError::cache(format!("Failed to get Redis connection: {e}"))),
            None => Err(StrataError::cache("Cache is disabled")),
        }
    }

    async fn scan(&self, conn: &mut deadpool_redis::Connection, pattern: &str) -> StrataResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut cursor: u64 = 0;
        loop {
            let (next, batch): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(self.scan_count)
                .query_async(conn)
                .await
                .map_err(|e| redis_error("scan", pattern, &e))?;
            keys.extend(batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        // SCAN may return a key more than once.
        keys.sort_unstable();
        keys.dedup();
        Ok(keys)
    }
}

fn redis_error(op: &str, key: &str, err: &RedisError) -> StrataError {
    StrataError::cache(format!("Failed to {op} '{key}': {err}"))
}

fn ttl_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl CacheInterface for RedisCacheService {
    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    async fn get_raw(&self, key: &str) -> StrataResult<Option<String>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let mut conn = self.get_conn().await?;
        let value: Option<String> = conn.get(key).await.map_err(|e| redis_error("get", key, &e))?;

        match &value {
            Some(_) => debug!("Cache hit for key '{}'", key),
            None => debug!("Cache miss for key '{}'", key),
        }

        Ok(value)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> StrataResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut conn = self.get_conn().await?;
        let ttl_secs = ttl_secs(ttl);

        conn.set_ex::<_, _, ()>(key, value, ttl_secs)
            .await
            .map_err(|e| redis_error("set", key, &e))?;

        debug!("Cached key '{}' with TTL {}s", key, ttl_secs);
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> StrataResult<bool> {
        if !self.is_enabled() {
            return Ok(false);
        }

        let mut conn = self.get_conn().await?;
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl_secs(ttl))
            .query_async(&mut conn)
            .await
            .map_err(|e| redis_error("set", key, &e))?;

        Ok(reply.is_some())
    }

    async fn delete(&self, keys: &[String]) -> StrataResult<u64> {
        if !self.is_enabled() || keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn().await?;
        let deleted: u64 = conn
            .del(keys)
            .await
            .map_err(|e| redis_error("delete", &keys.join(","), &e))?;

        debug!("Deleted {} of {} keys", deleted, keys.len());
        Ok(deleted)
    }

    async fn exists(&self, keys: &[String]) -> StrataResult<u64> {
        if !self.is_enabled() || keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn().await?;
        let count: u64 = conn
            .exists(keys)
            .await
            .map_err(|e| redis_error("check", &keys.join(","), &e))?;

        Ok(count)
    }

    async fn increment(&self, key: &str, window: Duration) -> StrataResult<i64> {
        if !self.is_enabled() {
            return Err(StrataError::cache("Cache is disabled"));
        }

        let mut conn = self.get_conn().await?;
        let count: i64 = conn
            .incr(key, 1)
            .await
            .map_err(|e| redis_error("increment", key, &e))?;

        if count == 1 {
            let secs = i64::try_from(ttl_secs(window)).unwrap_or(i64::MAX);
            conn.expire::<_, ()>(key, secs)
                .await
                .map_err(|e| redis_error("expire", key, &e))?;
        }

        Ok(count)
    }

    async fn keys_matching(&self, pattern: &str) -> StrataResult<Vec<String>> {
        if !self.is_enabled() {
            return Ok(Vec::new());
        }

        let mut conn = self.get_conn().await?;
        match self.key_scan {
            KeyScan::Keys => conn
                .keys(pattern)
                .await
                .map_err(|e| redis_error("list keys for", pattern, &e)),
            KeyScan::Scan => self.scan(&mut conn, pattern).await,
        }
    }

    async fn ping(&self) -> StrataResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut conn = self.get_conn().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| redis_error("ping", "", &e))?;
        Ok(())
    }
}

/// Create a Redis connection pool and check it with a `PING`.
pub async fn create_redis_pool(config: &RedisConfig) -> StrataResult<Pool> {
    info!("Creating Redis connection pool...");

    let pool = Config::from_url(&config.url)
        .builder()
        .map_err(|e| StrataError::Configuration(format!("Invalid Redis config: {e}")))?
        .max_size(config.pool_size as usize)
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| StrataError::Configuration(format!("Failed to create pool: {e}")))?;

    let mut conn = pool
        .get()
        .await
        .map_err(|e| StrataError::cache(format!("Failed to get Redis connection: {e}")))?;
    redis::cmd("PING")
        .query_async::<String>(&mut conn)
        .await
        .map_err(|e| redis_error("ping", "", &e))?;

    info!("Redis connection pool created successfully");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_cache() {
        let cache = RedisCacheService::disabled();
        assert!(!cache.is_enabled());
        assert_eq!(cache.get_raw("user:1").await.unwrap(), None);
        cache
            .set_raw("user:1", "{}", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get_raw("user:1").await.unwrap(), None);
        assert_eq!(cache.delete_pattern("users:list:*").await.unwrap(), 0);
        assert!(cache.ping().await.is_ok());
        assert!(cache.increment("ratelimit:x", Duration::from_secs(60)).await.is_err());
    }

    #[test]
    fn test_ttl_rounds_up_to_one_second() {
        assert_eq!(ttl_secs(Duration::from_millis(10)), 1);
        assert_eq!(ttl_secs(Duration::from_secs(1800)), 1800);
    }
}
