//! Prometheus metrics for the cache layer.

use crate::CacheOp;
use metrics::{counter, describe_counter};

/// Metric names.
pub mod names {
    /// Cache lookups answered from the cache.
    pub const CACHE_HITS_TOTAL: &str = "strata_cache_hits_total";
    /// Cache lookups that fell through to the store.
    pub const CACHE_MISSES_TOTAL: &str = "strata_cache_misses_total";
    /// Best-effort cache operations that failed.
    pub const CACHE_WARNINGS_TOTAL: &str = "strata_cache_warnings_total";
}

/// Key family label for single records.
pub const FAMILY_RECORD: &str = "record";
/// Key family label for list pages.
pub const FAMILY_COLLECTION: &str = "collection";

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        names::CACHE_HITS_TOTAL,
        "Total number of reads served from the cache"
    );
    describe_counter!(
        names::CACHE_MISSES_TOTAL,
        "Total number of reads that fell through to the store"
    );
    describe_counter!(
        names::CACHE_WARNINGS_TOTAL,
        "Total number of failed best-effort cache operations"
    );
}

/// Cache metrics recorder.
#[derive(Clone)]
pub struct CacheMetrics;

impl CacheMetrics {
    /// Record a hit for a key family.
    pub fn hit(family: &'static str) {
        counter!(names::CACHE_HITS_TOTAL, "family" => family).increment(1);
    }

    /// Record a miss for a key family.
    pub fn miss(family: &'static str) {
        counter!(names::CACHE_MISSES_TOTAL, "family" => family).increment(1);
    }

    /// Record a failed best-effort operation.
    pub fn warning(op: CacheOp) {
        counter!(names::CACHE_WARNINGS_TOTAL, "op" => op.as_str()).increment(1);
    }
}
