//! Health reporting shared by the adapters and the HTTP layer.

use serde::{Deserialize, Serialize};

/// Health check status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum HealthStatus {
    /// The component is healthy.
    Healthy,
    /// The component is degraded but functional.
    Degraded(String),
    /// The component is unhealthy.
    Unhealthy(String),
}

impl HealthStatus {
    /// Returns true if the status is healthy.
    #[must_use]
    pub const fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy)
    }

    /// Returns true if the status is unhealthy.
    #[must_use]
    pub const fn is_unhealthy(&self) -> bool {
        matches!(self, Self::Unhealthy(_))
    }

    /// Short lowercase label, e.g. for JSON health payloads.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded(_) => "degraded",
            Self::Unhealthy(_) => "unhealthy",
        }
    }

    /// The failure detail, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Healthy => None,
            Self::Degraded(msg) | Self::Unhealthy(msg) => Some(msg),
        }
    }
}

/// Reachability of the store and the cache, probed independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub store: HealthStatus,
    pub cache: HealthStatus,
}

impl HealthReport {
    /// True iff the store is healthy. A degraded cache still serves reads.
    #[must_use]
    pub const fn is_serving(&self) -> bool {
        self.store.is_healthy()
    }

    /// Overall status: the worst of the two components.
    #[must_use]
    pub fn overall(&self) -> HealthStatus {
        match (&self.store, &self.cache) {
            (HealthStatus::Unhealthy(msg), _) => HealthStatus::Unhealthy(msg.clone()),
            (_, HealthStatus::Healthy) => self.store.clone(),
            (_, HealthStatus::Degraded(msg) | HealthStatus::Unhealthy(msg)) => {
                HealthStatus::Degraded(msg.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degraded_cache_still_serving() {
        let report = HealthReport {
            store: HealthStatus::Healthy,
            cache: HealthStatus::Degraded("connection refused".to_string()),
        };
        assert!(report.is_serving());
        assert_eq!(report.overall().label(), "degraded");
    }

    #[test]
    fn test_store_failure_is_not_serving() {
        let report = HealthReport {
            store: HealthStatus::Unhealthy("timeout".to_string()),
            cache: HealthStatus::Healthy,
        };
        assert!(!report.is_serving());
        assert!(report.overall().is_unhealthy());
        assert_eq!(report.store.message(), Some("timeout"));
    }

    #[test]
    fn test_all_healthy() {
        let report = HealthReport {
            store: HealthStatus::Healthy,
            cache: HealthStatus::Healthy,
        };
        assert!(report.overall().is_healthy());
        assert_eq!(report.cache.message(), None);
    }
}
