//! Cache interface trait for abstracted caching operations.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use strata_core::{Interface, StrataResult};

/// Key-value cache with per-key expiry.
///
/// Non-authoritative: any entry may be missing at any time. Values are
/// JSON strings so the trait stays object safe.
#[async_trait]
pub trait CacheInterface: Interface + Send + Sync {
    /// Get a raw value. `None` if the key doesn't exist or has expired.
    async fn get_raw(&self, key: &str) -> StrataResult<Option<String>>;

    /// Set a raw value with a TTL.
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> StrataResult<()>;

    /// Set a value only if the key is absent. Returns `true` if it was set.
    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> StrataResult<bool>;

    /// Delete keys. Returns how many existed.
    async fn delete(&self, keys: &[String]) -> StrataResult<u64>;

    /// Count how many of `keys` exist.
    async fn exists(&self, keys: &[String]) -> StrataResult<u64>;

    /// Atomically increment a counter. The expiry `window` is set only when
    /// the increment creates the counter (the result is 1).
    async fn increment(&self, key: &str, window: Duration) -> StrataResult<i64>;

    /// List keys matching a glob pattern (`*` and `?`).
    async fn keys_matching(&self, pattern: &str) -> StrataResult<Vec<String>>;

    /// Delete every key matching a glob pattern. Returns the number deleted.
    async fn delete_pattern(&self, pattern: &str) -> StrataResult<u64> {
        let keys = self.keys_matching(pattern).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        self.delete(&keys).await
    }

    /// Check that the cache is reachable.
    async fn ping(&self) -> StrataResult<()>;

    /// Check if caching is enabled.
    fn is_enabled(&self) -> bool;
}

/// Extension trait with typed methods for convenience.
#[async_trait]
pub trait CacheExt: CacheInterface {
    /// Get a typed value. A payload that fails to decode is a
    /// `Serialization` error, which callers treat as a miss.
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> StrataResult<Option<T>> {
        match self.get_raw(key).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Set a typed value.
    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: Duration) -> StrataResult<()> {
        let json = serde_json::to_string(value)?;
        self.set_raw(key, &json, ttl).await
    }
}

impl<T: CacheInterface + ?Sized> CacheExt for T {}
