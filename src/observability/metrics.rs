//! Metrics collection and exposition.
//!
//! # Metrics
//! - `multisend_keys_generated_total` (counter): keys written by the key store
//! - `multisend_transactions_total` (counter): confirmed transactions by kind
//! - `multisend_transactions_reverted_total` (counter): reverted transactions by kind
//! - `multisend_transaction_seconds` (histogram): send-to-receipt latency by kind
//! - `multisend_deploy_seconds` (histogram): deployment latency
//! - `multisend_block_wait_seconds` (histogram): time spent waiting for a new block
//!
//! A run is short-lived, so nothing is served over HTTP. When a metrics file
//! is configured the Prometheus text rendering is written there once the
//! run ends (node-exporter textfile collector format).

use std::fs;
use std::path::{Path, PathBuf};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Installed recorder plus the file its snapshot goes to.
pub struct MetricsSnapshot {
    handle: PrometheusHandle,
    path: PathBuf,
}

impl MetricsSnapshot {
    /// Render the current values in Prometheus text format.
    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Write the rendered snapshot to the configured file.
    pub fn write(&self) -> std::io::Result<()> {
        fs::write(&self.path, self.render())?;
        tracing::debug!(path = %self.path.display(), "Metrics snapshot written");
        Ok(())
    }
}

/// Register metric descriptions with the active recorder.
pub fn describe_metrics() {
    metrics::describe_counter!("multisend_keys_generated_total", "Keys written by the key store");
    metrics::describe_counter!("multisend_transactions_total", "Confirmed transactions by kind");
    metrics::describe_counter!(
        "multisend_transactions_reverted_total",
        "Reverted transactions by kind"
    );
    metrics::describe_histogram!(
        "multisend_transaction_seconds",
        metrics::Unit::Seconds,
        "Send-to-receipt latency by kind"
    );
    metrics::describe_histogram!(
        "multisend_deploy_seconds",
        metrics::Unit::Seconds,
        "Contract deployment latency"
    );
    metrics::describe_histogram!(
        "multisend_block_wait_seconds",
        metrics::Unit::Seconds,
        "Time spent waiting for the next block"
    );
}

/// Install the Prometheus recorder when `path` is set.
///
/// Without a path the `metrics` macros stay no-ops.
pub fn init_metrics(path: Option<&Path>) -> Option<MetricsSnapshot> {
    let path = path?;
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            describe_metrics();
            tracing::info!(path = %path.display(), "Metrics recorder installed");
            Some(MetricsSnapshot {
                handle,
                path: path.to_path_buf(),
            })
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to install metrics recorder");
            None
        }
    }
}
