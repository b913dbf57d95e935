//! Metrics collection and Prometheus export.
//!
//! Initializes the metrics exporter and provides the /metrics endpoint handler.

use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use service_core::error::AppError;
use std::sync::OnceLock;

/// Global handle to the Prometheus recorder.
pub static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the metrics recorder.
///
/// Must run once at startup, before any metrics are recorded.
pub fn init_metrics() -> Result<(), AppError> {
    let handle = PrometheusBuilder::new().install_recorder().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("failed to install Prometheus recorder: {}", e))
    })?;

    METRICS_HANDLE.set(handle).map_err(|_| {
        AppError::ConfigError(anyhow::anyhow!(
            "failed to set metrics handle: already initialized"
        ))
    })
}

/// Get the current metrics in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Count a `POST /students` by the branch it took (`created` or `updated`).
pub fn record_student_upsert(outcome: &'static str) {
    counter!("grading_student_upserts_total", "outcome" => outcome).increment(1);
}
