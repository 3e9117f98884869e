//! Results that carry best-effort cache failures alongside the value.

use serde::Serialize;
use std::fmt::{self, Display};

/// The cache operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheOp {
    /// A lookup failed or returned an undecodable payload.
    Read,
    /// Writing a freshly loaded value failed.
    Populate,
    /// Removing a single-record entry failed.
    Delete,
    /// Dropping cached list pages failed.
    InvalidateCollections,
}

impl CacheOp {
    /// Metric label for this operation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Populate => "populate",
            Self::Delete => "delete",
            Self::InvalidateCollections => "invalidate_collections",
        }
    }
}

impl Display for CacheOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A cache-maintenance failure that did not fail the operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheWarning {
    pub op: CacheOp,
    pub key: String,
    pub message: String,
}

impl Display for CacheWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cache {} failed for '{}': {}", self.op, self.key, self.message)
    }
}

/// A successful repository result plus any cache warnings raised on the way.
///
/// The store outcome is authoritative; warnings only say that the cache
/// may lag behind it until entries expire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<CacheWarning>,
}

impl<T> Outcome<T> {
    /// An outcome with no warnings.
    #[must_use]
    pub const fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// True if any cache maintenance failed.
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Drops the warnings and returns the value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Maps the value, keeping the warnings.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_outcome() {
        let outcome = Outcome::clean(7);
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.into_value(), 7);
    }

    #[test]
    fn test_map_keeps_warnings() {
        let outcome = Outcome {
            value: 2,
            warnings: vec![CacheWarning {
                op: CacheOp::Populate,
                key: "user:1".to_string(),
                message: "connection reset".to_string(),
            }],
        };
        let mapped = outcome.map(|v| v * 10);
        assert_eq!(mapped.value, 20);
        assert!(mapped.is_degraded());
        assert_eq!(
            mapped.warnings[0].to_string(),
            "cache populate failed for 'user:1': connection reset"
        );
    }
}
