//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Scheduler (dispatched transcodes, outcomes, durations, pool occupancy)
//! - Torrent creation

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Scheduler Metrics
// =============================================================================

/// Transcodes started total.
pub static TRANSCODES_STARTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "transpack_transcodes_started_total",
        "Total encoder processes started",
    )
    .unwrap()
});

/// Transcodes finished total by result.
pub static TRANSCODES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("transpack_transcodes_total", "Total work items finished"),
        // "success", "exit_error", "launch_error", "template_error",
        // "missing_output", "empty_output", "lost"
        &["result"],
    )
    .unwrap()
});

/// Transcode duration in seconds.
pub static TRANSCODE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "transpack_transcode_duration_seconds",
            "Wall time of a single encoder process",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0, 300.0]),
        &["result"],
    )
    .unwrap()
});

/// Encoder processes currently running.
pub static SCHEDULER_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "transpack_scheduler_running",
        "Encoder processes currently running",
    )
    .unwrap()
});

// =============================================================================
// Torrent Metrics
// =============================================================================

/// Torrent files created total by result.
pub static TORRENTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("transpack_torrents_total", "Total torrent creation attempts"),
        &["result"], // "success", "failed", "no_client", "source_failed"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(TRANSCODES_STARTED.clone()),
        Box::new(TRANSCODES_TOTAL.clone()),
        Box::new(TRANSCODE_DURATION.clone()),
        Box::new(SCHEDULER_RUNNING.clone()),
        Box::new(TORRENTS_TOTAL.clone()),
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
        TRANSCODES_TOTAL.with_label_values(&["success"]).inc();
        let families = registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "transpack_transcodes_total"));
    }
}
