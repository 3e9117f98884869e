//! Timeout wrapper for async operations.

use crate::Deadline;
use std::future::Future;
use std::time::Duration;
use strata_core::{StrataError, Upstream};
use tracing::warn;

/// Wraps an async operation with a timeout. Elapsing is reported as the
/// given upstream being unavailable.
pub async fn with_timeout<F, Fut, T>(duration: Duration, upstream: Upstream, f: F) -> Result<T, StrataError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, StrataError>>,
{
    tokio::time::timeout(duration, f()).await.map_err(|_| {
        warn!(%upstream, ?duration, "call timed out");
        StrataError::UpstreamUnavailable {
            upstream,
            message: format!("Operation timed out after {duration:?}"),
        }
    })?
}

/// Per-component call budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Upper bound for one store call.
    pub store: Duration,
    /// Upper bound for one cache call.
    pub cache: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            store: Duration::from_secs(5),
            cache: Duration::from_secs(1),
        }
    }
}

impl TimeoutConfig {
    /// Runs a store call within `min(deadline remaining, store budget)`.
    pub async fn store_call<F, Fut, T>(&self, deadline: Deadline, f: F) -> Result<T, StrataError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, StrataError>>,
    {
        Self::bounded(deadline, self.store, Upstream::Store, f).await
    }

    /// Runs a cache call within `min(deadline remaining, cache budget)`.
    pub async fn cache_call<F, Fut, T>(&self, deadline: Deadline, f: F) -> Result<T, StrataError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, StrataError>>,
    {
        Self::bounded(deadline, self.cache, Upstream::Cache, f).await
    }

    async fn bounded<F, Fut, T>(
        deadline: Deadline,
        default: Duration,
        upstream: Upstream,
        f: F,
    ) -> Result<T, StrataError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, StrataError>>,
    {
        if deadline.is_expired() {
            return Err(StrataError::UpstreamUnavailable {
                upstream,
                message: "request deadline exceeded".to_string(),
            });
        }
        with_timeout(deadline.budget(default), upstream, f).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timeout_success() {
        let result = with_timeout(Duration::from_secs(1), Upstream::Store, || async {
            Ok::<_, StrataError>(42)
        })
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_exceeded() {
        let result = with_timeout(Duration::from_millis(10), Upstream::Cache, || async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok::<_, StrataError>(42)
        })
        .await;

        assert_eq!(result.unwrap_err().upstream(), Some(Upstream::Cache));
    }

    #[tokio::test(start_paused = true)]
    async fn test_caller_deadline_tighter_than_default() {
        let timeouts = TimeoutConfig::default();
        let deadline = Deadline::after(Duration::from_millis(50));
        let result = timeouts
            .store_call(deadline, || async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok::<_, StrataError>(())
            })
            .await;
        assert_eq!(result.unwrap_err().upstream(), Some(Upstream::Store));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_deadline_fails_without_calling() {
        let timeouts = TimeoutConfig::default();
        let deadline = Deadline::after(Duration::from_millis(10));
        tokio::time::advance(Duration::from_millis(20)).await;

        let mut called = false;
        let result = timeouts
            .cache_call(deadline, || {
                called = true;
                async { Ok::<_, StrataError>(()) }
            })
            .await;
        assert!(result.is_err());
        assert!(!called);
    }

    #[tokio::test(start_paused = true)]
    async fn test_component_budget_applies_without_deadline() {
        let timeouts = TimeoutConfig {
            store: Duration::from_secs(5),
            cache: Duration::from_millis(20),
        };
        let result = timeouts
            .cache_call(Deadline::none(), || async {
                tokio::time::sleep(Duration::from_millis(100)).await;
                Ok::<_, StrataError>(())
            })
            .await;
        assert_eq!(result.unwrap_err().upstream(), Some(Upstream::Cache));
    }
}
