//! Cache metrics recording.

use metrics::{counter, gauge, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Describes the cache metrics. Call once at startup.
pub fn register_cache_metrics() {
    metrics::describe_counter!("storefront_cache_hits_total", "Total number of cache hits");
    metrics::describe_counter!(
        "storefront_cache_misses_total",
        "Total number of cache misses"
    );
    metrics::describe_counter!(
        "storefront_cache_populate_failures_total",
        "Read-through results that could not be written back"
    );
    metrics::describe_counter!(
        "storefront_cache_backend_errors_total",
        "Key store operations that failed"
    );
    metrics::describe_counter!(
        "storefront_cache_invalidated_keys_total",
        "Keys removed by invalidation requests"
    );
    metrics::describe_counter!(
        "storefront_cache_evictions_total",
        "Total number of in-memory cache evictions"
    );
    metrics::describe_gauge!(
        "storefront_cache_entries",
        "Current number of entries in the in-memory cache"
    );
    metrics::describe_histogram!(
        "storefront_cache_operation_seconds",
        "Time spent on cache operations"
    );
}

/// Cache metrics recorder.
///
/// Keeps local atomic counters next to the exported metrics so tests and the
/// health endpoint can read them without a recorder installed.
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    backend_errors: Arc<AtomicU64>,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("storefront_cache_hits_total").increment(1);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("storefront_cache_misses_total").increment(1);
    }

    pub fn record_populate_failure(&self) {
        counter!("storefront_cache_populate_failures_total").increment(1);
    }

    /// Records a failed key store call. `operation` is get, set or delete.
    pub fn record_backend_error(&self, operation: &'static str) {
        self.backend_errors.fetch_add(1, Ordering::Relaxed);
        counter!("storefront_cache_backend_errors_total", "operation" => operation).increment(1);
    }

    pub fn record_invalidated(&self, count: usize) {
        counter!("storefront_cache_invalidated_keys_total").increment(count as u64);
    }

    pub fn record_eviction(&self, reason: &'static str) {
        counter!("storefront_cache_evictions_total", "reason" => reason).increment(1);
    }

    pub fn update_entry_count(&self, count: u64) {
        gauge!("storefront_cache_entries").set(count as f64);
    }

    pub fn record_operation_duration(&self, operation: &'static str, duration: Duration) {
        histogram!("storefront_cache_operation_seconds", "operation" => operation)
            .record(duration.as_secs_f64());
    }

    /// Hit rate over the lifetime of this recorder.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn backend_errors(&self) -> u64 {
        self.backend_errors.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_metrics_hit_rate() {
        let metrics = CacheMetrics::new();
        assert_eq!(metrics.hit_rate(), 0.0);

        // 3 hits, 1 miss = 75%
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_hit();
        metrics.record_miss();

        assert!((metrics.hit_rate() - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = CacheMetrics::new();
        let clone = metrics.clone();

        clone.record_miss();
        clone.record_backend_error("get");

        assert_eq!(metrics.misses(), 1);
        assert_eq!(metrics.backend_errors(), 1);
    }
}
