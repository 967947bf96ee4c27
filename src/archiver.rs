//! Retention: version archiving and pruning of logs, metrics and old archives

use chrono::{DateTime, Duration, Months, Utc};
use serde::Serialize;
use serde_json::json;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::config::RetentionConfig;
use crate::error::StoreError;
use crate::metrics::PipelineMetrics;
use crate::models::{ArchivedDataVersion, DataType, NewUpdateLog, RunStatus, ARCHIVE_CLEANUP_SCOPE};
use crate::store::Store;

/// Result of one isolated cleanup operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupOperation {
    pub operation: &'static str,
    pub status: RunStatus,
    pub records: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CleanupOperation {
    fn from_result(operation: &'static str, result: Result<u64, String>) -> Self {
        match result {
            Ok(records) => {
                info!("Cleanup operation {} removed {} record(s)", operation, records);
                Self {
                    operation,
                    status: RunStatus::Success,
                    records,
                    error: None,
                }
            }
            Err(e) => {
                error!("Cleanup operation {} failed: {}", operation, e);
                Self {
                    operation,
                    status: RunStatus::Failed,
                    records: 0,
                    error: Some(e),
                }
            }
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == RunStatus::Success
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupSummary {
    pub status: RunStatus,
    pub operations: Vec<CleanupOperation>,
    pub total_records: u64,
    pub execution_time_ms: i64,
    /// Id of the aggregate `archive_cleanup` log row, when it could be written
    pub log_id: Option<i64>,
}

/// Subtracts calendar months, clamping to the end of shorter months
pub fn months_before(at: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    at.checked_sub_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[derive(Clone)]
pub struct Archiver {
    store: Store,
    retention: RetentionConfig,
}

impl Archiver {
    pub fn new(store: Store, retention: RetentionConfig) -> Self {
        Self { store, retention }
    }

    pub fn retention(&self) -> &RetentionConfig {
        &self.retention
    }

    /// Moves inactive versions of `data_type` older than `retention_days` into
    /// the archive and returns how many were moved.
    ///
    /// Rows are copied before the originals are deleted. A failed copy leaves
    /// the live table untouched; a failed delete is returned as an error and
    /// the copies stay in the archive.
    pub async fn archive(&self, data_type: DataType, retention_days: i64) -> Result<u64, StoreError> {
        let now = Utc::now();
        let cutoff = now - Duration::days(retention_days);

        let expired = self.store.versions.expired_inactive(data_type, cutoff).await?;
        if expired.is_empty() {
            return Ok(0);
        }

        let ids: Vec<String> = expired.iter().map(|v| v.id.clone()).collect();
        let archived: Vec<ArchivedDataVersion> = expired
            .into_iter()
            .map(|version| ArchivedDataVersion {
                version,
                archived_at: now,
            })
            .collect();

        let copied = self.store.archive.insert_archived(&archived).await?;
        let deleted = self.store.versions.delete_versions(&ids).await?;

        if deleted != copied {
            warn!(
                "Archived {} {} version(s) but deleted {} from the live table",
                copied, data_type, deleted
            );
        }

        PipelineMetrics::record_archived(data_type, copied);
        info!(
            "Archived {} {} version(s) older than {} days",
            copied, data_type, retention_days
        );
        Ok(copied)
    }

    /// Archives with the configured version retention window
    pub async fn archive_expired(&self, data_type: DataType) -> Result<u64, StoreError> {
        self.archive(data_type, self.retention.version_retention_days).await
    }

    /// Archives every data type. A failing type does not stop the others;
    /// the sweep fails if any type failed.
    async fn archive_all(&self) -> Result<u64, String> {
        let mut total = 0;
        let mut failures = Vec::new();
        for data_type in DataType::ALL {
            match self.archive_expired(data_type).await {
                Ok(count) => total += count,
                Err(e) => failures.push(format!("{data_type}: {e}")),
            }
        }
        if failures.is_empty() {
            Ok(total)
        } else {
            Err(failures.join("; "))
        }
    }

    /// Runs the four retention operations independently and records one
    /// aggregate `archive_cleanup` log entry
    pub async fn run_cleanup(&self) -> CleanupSummary {
        let started = Instant::now();
        let now = Utc::now();
        info!("Starting archive cleanup");

        let mut operations = Vec::with_capacity(4);

        operations.push(CleanupOperation::from_result(
            "version_archive",
            self.archive_all().await,
        ));

        let log_cutoff = months_before(now, self.retention.log_retention_months);
        operations.push(CleanupOperation::from_result(
            "logs_cleanup",
            self.store
                .logs
                .delete_before(log_cutoff)
                .await
                .map_err(|e| e.to_string()),
        ));

        let metrics_cutoff = months_before(now, self.retention.metrics_retention_months);
        operations.push(CleanupOperation::from_result(
            "metrics_cleanup",
            self.store
                .quality_metrics
                .delete_before(metrics_cutoff)
                .await
                .map_err(|e| e.to_string()),
        ));

        let archive_cutoff = now - Duration::days(self.retention.archive_retention_days);
        operations.push(CleanupOperation::from_result(
            "archive_purge",
            self.store
                .archive
                .purge_archived_before(archive_cutoff)
                .await
                .map_err(|e| e.to_string()),
        ));

        let succeeded = operations.iter().filter(|op| op.succeeded()).count();
        let failed = operations.len() - succeeded;
        let status = RunStatus::from_counts(succeeded, failed);
        let total_records: u64 = operations.iter().map(|op| op.records).sum();
        let execution_time_ms = started.elapsed().as_millis() as i64;

        let mut log = NewUpdateLog::new(
            ARCHIVE_CLEANUP_SCOPE,
            status,
            format!(
                "Archive cleanup {}: {} of {} operations succeeded",
                status.as_str(),
                succeeded,
                operations.len()
            ),
        )
        .with_execution_time(execution_time_ms)
        .with_records(total_records as i64);

        if failed > 0 {
            let failures: Vec<_> = operations
                .iter()
                .filter(|op| !op.succeeded())
                .map(|op| json!({ "operation": op.operation, "error": op.error }))
                .collect();
            log = log.with_error(json!({ "failures": failures }));
        }

        let log_id = match self.store.logs.append(log).await {
            Ok(entry) => Some(entry.id),
            Err(e) => {
                warn!("Failed to record archive cleanup log: {}", e);
                None
            }
        };

        PipelineMetrics::record_cleanup_run(status);
        info!(
            "Archive cleanup finished with status {} in {}ms ({} records)",
            status.as_str(),
            execution_time_ms,
            total_records
        );

        CleanupSummary {
            status,
            operations,
            total_records,
            execution_time_ms,
            log_id,
        }
    }
}
