//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Aggregated queries (duration, result counts)
//! - Per-provider outcomes (succeeded, failed, timed out)
//! - Provider cache lookups (hit, stale, miss)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Aggregator Metrics
// =============================================================================

/// Aggregated query duration in seconds.
pub static QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "magnetar_query_duration_seconds",
            "Duration of aggregated torrent queries",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["kind"], // "movie", "episode"
    )
    .unwrap()
});

/// Results returned per aggregated query (after dedup).
pub static QUERY_RESULTS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "magnetar_query_results",
            "Number of results returned per aggregated query",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
        &["kind"],
    )
    .unwrap()
});

/// Provider outcomes within aggregated queries.
pub static PROVIDER_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "magnetar_provider_outcomes_total",
            "Provider outcomes within aggregated queries",
        ),
        &["provider", "outcome"], // outcome: "succeeded", "failed", "timed_out"
    )
    .unwrap()
});

// =============================================================================
// Cache Metrics
// =============================================================================

/// Provider cache lookups by result.
pub static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "magnetar_cache_lookups_total",
            "Provider cache lookups by result",
        ),
        &["provider", "result"], // result: "hit", "stale", "miss", "error"
    )
    .unwrap()
});

/// All core collectors, for registration in the server's registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(QUERY_DURATION.clone()),
        Box::new(QUERY_RESULTS.clone()),
        Box::new(PROVIDER_OUTCOMES.clone()),
        Box::new(CACHE_LOOKUPS.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Registry;

    #[test]
    fn test_all_metrics_register() {
        let registry = Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }

        PROVIDER_OUTCOMES
            .with_label_values(&["yts", "succeeded"])
            .inc();
        let families = registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "magnetar_provider_outcomes_total"));
    }
}
