use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec,
};
use std::time::Duration;
use tracing::debug;

use crate::models::{DataType, RunStatus};

lazy_static! {
    /// Update runs by data type and outcome
    static ref UPDATE_RUNS: CounterVec = register_counter_vec!(
        "trendvault_update_runs_total",
        "Total number of data update runs",
        &["data_type", "status"]
    ).expect("Failed to create update_runs metric");

    /// Wall-clock time of one aggregate-and-commit run
    static ref UPDATE_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "trendvault_update_duration_seconds",
        "Duration of data update runs in seconds",
        &["data_type"],
        vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    ).expect("Failed to create update_duration metric");

    /// Individual upstream source failures
    static ref SOURCE_FAILURES: CounterVec = register_counter_vec!(
        "trendvault_source_failures_total",
        "Total number of failed source fetches",
        &["source"]
    ).expect("Failed to create source_failures metric");

    /// Versions moved to the archive
    static ref VERSIONS_ARCHIVED: CounterVec = register_counter_vec!(
        "trendvault_versions_archived_total",
        "Total number of versions moved to the archive",
        &["data_type"]
    ).expect("Failed to create versions_archived metric");

    /// Cleanup runs by aggregate status
    static ref CLEANUP_RUNS: CounterVec = register_counter_vec!(
        "trendvault_cleanup_runs_total",
        "Total number of archive cleanup runs",
        &["status"]
    ).expect("Failed to create cleanup_runs metric");
}

/// Pipeline metrics collector
pub struct PipelineMetrics;

impl PipelineMetrics {
    /// Record the outcome and duration of one update run
    pub fn record_update_run(data_type: DataType, status: RunStatus, duration: Duration) {
        UPDATE_RUNS
            .with_label_values(&[data_type.as_str(), status.as_str()])
            .inc();

        UPDATE_DURATION_SECONDS
            .with_label_values(&[data_type.as_str()])
            .observe(duration.as_secs_f64());

        debug!(
            "Recorded {} update run: {} in {:?}",
            data_type,
            status.as_str(),
            duration
        );
    }

    pub fn record_source_failure(source: &str) {
        SOURCE_FAILURES.with_label_values(&[source]).inc();
    }

    pub fn record_archived(data_type: DataType, count: u64) {
        if count > 0 {
            VERSIONS_ARCHIVED
                .with_label_values(&[data_type.as_str()])
                .inc_by(count as f64);
        }
    }

    pub fn record_cleanup_run(status: RunStatus) {
        CLEANUP_RUNS.with_label_values(&[status.as_str()]).inc();
    }
}
