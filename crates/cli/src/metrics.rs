//! Prometheus metrics export.
//!
//! The core crate defines the metrics; this module registers them and
//! writes the text exposition to a file at the end of a run, for pickup by
//! a node exporter textfile collector.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntGauge, Registry, TextEncoder};
use std::path::Path;
use tracing::warn;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Exit status of the last run, as the full error bitmask.
pub static RUN_ERROR_BITS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "transpack_run_error_bits",
        "Bitmask of error kinds hit by the last run",
    )
    .unwrap()
});

fn register_metrics(registry: &Registry) {
    let mut metrics = transpack_core::metrics::all_metrics();
    metrics.push(Box::new(RUN_ERROR_BITS.clone()));
    for metric in metrics {
        if let Err(e) = registry.register(metric) {
            warn!(error = %e, "Failed to register metric");
        }
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics are not valid UTF-8")
}

/// Writes all metrics to `path`.
pub async fn write_metrics(path: &Path) -> Result<()> {
    let text = encode_metrics()?;
    tokio::fs::write(path, text)
        .await
        .with_context(|| format!("Failed to write metrics to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use transpack_core::metrics::TRANSCODES_STARTED;

    #[test]
    fn test_encode_contains_core_metrics() {
        TRANSCODES_STARTED.inc();
        let text = encode_metrics().unwrap();
        assert!(text.contains("transpack_transcodes_started_total"));
    }

    #[tokio::test]
    async fn test_write_metrics() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("transpack.prom");
        RUN_ERROR_BITS.set(512);
        tokio_test::assert_ok!(write_metrics(&path).await);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("transpack_run_error_bits 512"));
    }
}
