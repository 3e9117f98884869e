//! In-process cache for development and tests.

use super::CacheInterface;
use async_trait::async_trait;
use shaku::Component;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use strata_core::{StrataError, StrataResult};
use tokio::sync::RwLock;
use tokio::time::Instant;

/// A stored value and its expiry.
#[derive(Debug, Clone)]
pub struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// A `HashMap` behind a `tokio` lock with per-key expiry.
///
/// Expired entries are dropped lazily when touched. Expiry follows
/// `tokio::time`, so paused-clock tests can advance past a TTL.
#[derive(Component, Debug, Clone, Default)]
#[shaku(interface = CacheInterface)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.read().await.values().filter(|e| e.is_live(now)).count()
    }

    /// True if no live entries remain.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Redis-style glob match supporting `*` and `?`.
#[must_use]
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let k: Vec<char> = key.chars().collect();
    let (mut pi, mut ki) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while ki < k.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == k[ki]) {
            pi += 1;
            ki += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ki));
            pi += 1;
        } else if let Some((sp, sk)) = star {
            pi = sp + 1;
            ki = sk + 1;
            star = Some((sp, sk + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|&c| c == '*')
}

#[async_trait]
impl CacheInterface for MemoryCache {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn get_raw(&self, key: &str) -> StrataResult<Option<String>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
                None => return Ok(None),
                Some(_) => {}
            }
        }
        self.entries.write().await.retain(|_, e| e.is_live(now));
        Ok(None)
    }

    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> StrataResult<()> {
        let entry = Entry {
            value: value.to_string(),
            expires_at: Some(Instant::now() + ttl),
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn set_nx(&self, key: &str, value: &str, ttl: Duration) -> StrataResult<bool> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|e| e.is_live(now)) {
            return Ok(false);
        }
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(now + ttl),
            },
        );
        Ok(true)
    }

    async fn delete(&self, keys: &[String]) -> StrataResult<u64> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let deleted = keys
            .iter()
            .filter_map(|k| entries.remove(k))
            .filter(|e| e.is_live(now))
            .count();
        Ok(deleted as u64)
    }

    async fn exists(&self, keys: &[String]) -> StrataResult<u64> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        let count = keys
            .iter()
            .filter(|k| entries.get(k.as_str()).is_some_and(|e| e.is_live(now)))
            .count();
        Ok(count as u64)
    }

    async fn increment(&self, key: &str, window: Duration) -> StrataResult<i64> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let current = match entries.get(key).filter(|e| e.is_live(now)) {
            Some(entry) => Some((
                entry
                    .value
                    .parse::<i64>()
                    .map_err(|_| StrataError::cache(format!("value at '{key}' is not an integer")))?,
                entry.expires_at,
            )),
            None => None,
        };

        let (count, expires_at) = match current {
            Some((n, expires_at)) => (n + 1, expires_at),
            None => (1, Some(now + window)),
        };
        entries.insert(
            key.to_string(),
            Entry {
                value: count.to_string(),
                expires_at,
            },
        );
        Ok(count)
    }

    async fn keys_matching(&self, pattern: &str) -> StrataResult<Vec<String>> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries
            .iter()
            .filter(|(k, e)| e.is_live(now) && glob_match(pattern, k))
            .map(|(k, _)| k.clone())
            .collect();
        keys.sort_unstable();
        Ok(keys)
    }

    async fn ping(&self) -> StrataResult<()> {
        Ok(())
    }
}
