//! Update runs: aggregate, commit, record
//!
//! A run refreshes one data type end to end and always leaves one
//! `update_logs` row behind. Batch runs walk the enabled configs in order and
//! skip the ones that are not yet due unless forced.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::aggregator::Aggregator;
use crate::archiver::Archiver;
use crate::error::{PipelineError, StoreError};
use crate::metrics::PipelineMetrics;
use crate::models::{DataType, DataVersion, NewUpdateLog, RunStatus, UnknownDataType};
use crate::store::Store;
use crate::versioning::VersionStore;

/// What an update request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateTarget {
    All,
    Single(DataType),
}

impl FromStr for UpdateTarget {
    type Err = UnknownDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(UpdateTarget::All)
        } else {
            s.parse().map(UpdateTarget::Single)
        }
    }
}

/// Result of refreshing one data type
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeOutcome {
    pub data_type: DataType,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub execution_time_ms: i64,
    pub timestamp: DateTime<Utc>,
}

impl TypeOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == RunStatus::Success
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub status: RunStatus,
    pub results: Vec<TypeOutcome>,
    pub total_updated: usize,
    pub total_failed: usize,
    /// Enabled types that were not yet due
    pub skipped: Vec<DataType>,
}

#[derive(Clone)]
pub struct UpdatePipeline {
    store: Store,
    aggregator: Arc<Aggregator>,
    versions: VersionStore,
    archiver: Archiver,
}

impl UpdatePipeline {
    pub fn new(store: Store, aggregator: Arc<Aggregator>, archiver: Archiver) -> Self {
        Self {
            versions: VersionStore::new(store.versions.clone()),
            store,
            aggregator,
            archiver,
        }
    }

    pub fn versions(&self) -> &VersionStore {
        &self.versions
    }

    pub fn archiver(&self) -> &Archiver {
        &self.archiver
    }

    /// Aggregates and commits one data type
    async fn refresh(&self, data_type: DataType) -> Result<DataVersion, PipelineError> {
        let payload = self.aggregator.aggregate(data_type).await?;
        let version = self.versions.commit(payload, data_type.commit_source()).await?;
        Ok(version)
    }

    /// Runs one data type to completion and records the outcome
    async fn execute(&self, data_type: DataType, interval: Duration) -> TypeOutcome {
        let started = Instant::now();
        info!("Starting {} update", data_type);

        let result = self.refresh(data_type).await;
        let elapsed = started.elapsed();
        let execution_time_ms = elapsed.as_millis() as i64;
        let now = Utc::now();

        let (outcome, log) = match result {
            Ok(version) => {
                if let Err(e) = self
                    .store
                    .configs
                    .mark_updated(data_type, now, now + interval)
                    .await
                {
                    warn!("Failed to record update time for {}: {}", data_type, e);
                }

                if let Err(e) = self.archiver.archive_expired(data_type).await {
                    warn!("Post-commit archiving failed for {}: {}", data_type, e);
                }

                info!(
                    "Updated {} to version {} (id={}) in {}ms",
                    data_type, version.version, version.id, execution_time_ms
                );

                let log = NewUpdateLog::new(
                    data_type.as_str(),
                    RunStatus::Success,
                    format!(
                        "Successfully updated {} data to version {}",
                        data_type, version.version
                    ),
                )
                .with_execution_time(execution_time_ms)
                .with_records(1);

                let outcome = TypeOutcome {
                    data_type,
                    status: RunStatus::Success,
                    version_id: Some(version.id),
                    version: Some(version.version),
                    error: None,
                    execution_time_ms,
                    timestamp: now,
                };
                (outcome, log)
            }
            Err(e) => {
                error!("Update of {} failed during {}: {}", data_type, e.stage(), e);

                let log = NewUpdateLog::new(
                    data_type.as_str(),
                    RunStatus::Failed,
                    format!("Failed to update {} data", data_type),
                )
                .with_execution_time(execution_time_ms)
                .with_error(json!({ "error": e.to_string(), "stage": e.stage() }));

                let outcome = TypeOutcome {
                    data_type,
                    status: RunStatus::Failed,
                    version_id: None,
                    version: None,
                    error: Some(e.to_string()),
                    execution_time_ms,
                    timestamp: now,
                };
                (outcome, log)
            }
        };

        if let Err(e) = self.store.logs.append(log).await {
            warn!("Failed to write update log for {}: {}", data_type, e);
        }
        PipelineMetrics::record_update_run(data_type, outcome.status, elapsed);

        outcome
    }

    /// Manual refresh of one data type; ignores the schedule
    pub async fn run_single(&self, data_type: DataType) -> TypeOutcome {
        let interval = match self.store.configs.get(data_type).await {
            Ok(Some(config)) => config.interval(),
            Ok(None) => Duration::minutes(i64::from(data_type.default_interval_minutes())),
            Err(e) => {
                warn!(
                    "Could not read update config for {}, using default interval: {}",
                    data_type, e
                );
                Duration::minutes(i64::from(data_type.default_interval_minutes()))
            }
        };
        self.execute(data_type, interval).await
    }

    /// Refreshes every enabled data type that is due, or all of them when forced
    pub async fn run_batch(&self, force: bool) -> Result<BatchSummary, StoreError> {
        let configs = self.store.configs.enabled().await?;
        let now = Utc::now();
        info!(
            "Starting batch update over {} enabled config(s) (force={})",
            configs.len(),
            force
        );

        let mut results = Vec::new();
        let mut skipped = Vec::new();
        for config in configs {
            if !force && !config.is_due(now) {
                info!(
                    "Skipping {}: next update due at {}",
                    config.data_type,
                    config
                        .next_update
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_default()
                );
                skipped.push(config.data_type);
                continue;
            }
            results.push(self.execute(config.data_type, config.interval()).await);
        }

        let total_updated = results.iter().filter(|r| r.succeeded()).count();
        let total_failed = results.len() - total_updated;
        let status = RunStatus::from_counts(total_updated, total_failed);

        info!(
            "Batch update {}: {} updated, {} failed, {} skipped",
            status.as_str(),
            total_updated,
            total_failed,
            skipped.len()
        );

        Ok(BatchSummary {
            status,
            results,
            total_updated,
            total_failed,
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetentionConfig;
    use crate::sources::SourceSet;
    use crate::store::{FailureConfig, MemoryStore, UpdateConfigRepository, VersionRepository};
    use crate::test_utils::{
        assert_no_active, assert_single_active, DataVersionBuilder, FailingSource,
        UpdateConfigBuilder,
    };
    use std::time::Duration as StdDuration;

    fn pipeline_with(memory: &Arc<MemoryStore>, sources: SourceSet) -> UpdatePipeline {
        let store = Store::memory(memory.clone());
        let aggregator = Arc::new(Aggregator::new(sources, store.community.clone()));
        let archiver = Archiver::new(store.clone(), RetentionConfig::default());
        UpdatePipeline::new(store, aggregator, archiver)
    }

    fn pipeline(memory: &Arc<MemoryStore>) -> UpdatePipeline {
        pipeline_with(memory, SourceSet::stubs(StdDuration::ZERO))
    }

    #[test]
    fn test_update_target_parsing() {
        assert_eq!("all".parse::<UpdateTarget>().unwrap(), UpdateTarget::All);
        assert_eq!(
            "market".parse::<UpdateTarget>().unwrap(),
            UpdateTarget::Single(DataType::Market)
        );
        assert!("weather".parse::<UpdateTarget>().is_err());
    }

    #[tokio::test]
    async fn test_single_run_commits_and_logs() {
        let memory = Arc::new(MemoryStore::new());
        memory
            .upsert(&UpdateConfigBuilder::new(DataType::Market).build())
            .await
            .unwrap();

        let outcome = pipeline(&memory).run_single(DataType::Market).await;

        assert!(outcome.succeeded());
        let active = assert_single_active(&memory.versions().await, DataType::Market);
        assert_eq!(outcome.version_id.as_deref(), Some(active.id.as_str()));
        assert_eq!(active.source, "market-research");

        let logs = memory.logs().await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].data_type, "market");
        assert_eq!(logs[0].status, "success");

        let config = memory.get(DataType::Market).await.unwrap().unwrap();
        let last = config.last_update.unwrap();
        assert_eq!(config.next_update, Some(last + Duration::minutes(1440)));
    }

    #[tokio::test]
    async fn test_single_run_ignores_schedule() {
        let memory = Arc::new(MemoryStore::new());
        memory
            .upsert(&UpdateConfigBuilder::new(DataType::Trends).due_in(60).build())
            .await
            .unwrap();

        let outcome = pipeline(&memory).run_single(DataType::Trends).await;
        assert!(outcome.succeeded());
    }

    #[tokio::test]
    async fn test_single_run_failure_is_logged_with_stage() {
        let memory = Arc::new(MemoryStore::new());
        let sources = SourceSet {
            trends: vec![Arc::new(FailingSource::new("google-trends"))],
            products: Vec::new(),
        };

        let outcome = pipeline_with(&memory, sources).run_single(DataType::Trends).await;

        assert_eq!(outcome.status, RunStatus::Failed);
        assert!(outcome.error.as_deref().unwrap().contains("google-trends"));
        assert!(memory.versions().await.is_empty());

        let logs = memory.logs().await;
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, "failed");
        let details = logs[0].error_details.as_ref().unwrap();
        assert_eq!(details["stage"], "aggregate");
        assert!(details["error"].as_str().unwrap().contains("sources failed"));
    }

    #[tokio::test]
    async fn test_commit_failure_is_logged_as_commit_stage() {
        let memory = Arc::new(MemoryStore::with_failures(FailureConfig::fail_on_operation(
            "insert_version",
        )));

        let outcome = pipeline(&memory).run_single(DataType::Market).await;

        assert_eq!(outcome.status, RunStatus::Failed);
        let logs = memory.logs().await;
        assert_eq!(logs[0].error_details.as_ref().unwrap()["stage"], "commit");
        assert_no_active(&memory.versions().await, DataType::Market);
    }

    #[tokio::test]
    async fn test_batch_skips_configs_not_yet_due() {
        let memory = Arc::new(MemoryStore::new());
        memory
            .upsert(&UpdateConfigBuilder::new(DataType::Trends).overdue_by(5).build())
            .await
            .unwrap();
        memory
            .upsert(&UpdateConfigBuilder::new(DataType::Market).due_in(120).build())
            .await
            .unwrap();
        memory
            .upsert(&UpdateConfigBuilder::new(DataType::Community).build())
            .await
            .unwrap();

        let summary = pipeline(&memory).run_batch(false).await.unwrap();

        assert_eq!(summary.status, RunStatus::Success);
        assert_eq!(summary.total_updated, 2);
        assert_eq!(summary.total_failed, 0);
        assert_eq!(summary.skipped, vec![DataType::Market]);

        let logged: Vec<String> = memory.logs().await.into_iter().map(|l| l.data_type).collect();
        assert!(logged.contains(&"trends".to_string()));
        assert!(logged.contains(&"community".to_string()));
        assert!(!logged.contains(&"market".to_string()));
        assert_no_active(&memory.versions().await, DataType::Market);
    }

    #[tokio::test]
    async fn test_forced_batch_runs_everything_enabled() {
        let memory = Arc::new(MemoryStore::new());
        memory
            .upsert(&UpdateConfigBuilder::new(DataType::Market).due_in(120).build())
            .await
            .unwrap();
        memory
            .upsert(&UpdateConfigBuilder::new(DataType::Insights).disabled().build())
            .await
            .unwrap();

        let summary = pipeline(&memory).run_batch(true).await.unwrap();

        assert_eq!(summary.total_updated, 1);
        assert!(summary.skipped.is_empty());
        assert_eq!(summary.results[0].data_type, DataType::Market);
        assert_no_active(&memory.versions().await, DataType::Insights);
    }

    #[tokio::test]
    async fn test_batch_partial_failure() {
        let memory = Arc::new(MemoryStore::new());
        for data_type in [DataType::Trends, DataType::Market] {
            memory
                .upsert(&UpdateConfigBuilder::new(data_type).build())
                .await
                .unwrap();
        }
        let sources = SourceSet {
            trends: vec![Arc::new(FailingSource::new("google-trends"))],
            products: Vec::new(),
        };

        let summary = pipeline_with(&memory, sources).run_batch(false).await.unwrap();

        assert_eq!(summary.status, RunStatus::Partial);
        assert_eq!(summary.total_updated, 1);
        assert_eq!(summary.total_failed, 1);
        assert_eq!(memory.logs().await.len(), 2);
    }

    #[tokio::test]
    async fn test_batch_config_read_failure_surfaces() {
        let memory = Arc::new(MemoryStore::with_failures(FailureConfig::fail_on_operation(
            "config_read",
        )));
        assert!(pipeline(&memory).run_batch(false).await.is_err());
    }

    #[tokio::test]
    async fn test_successful_run_archives_expired_versions() {
        let memory = Arc::new(MemoryStore::new());
        let expired = DataVersionBuilder::new(DataType::Market).days_old(45).build();
        memory.insert_version(&expired).await.unwrap();

        let outcome = pipeline(&memory).run_single(DataType::Market).await;

        assert!(outcome.succeeded());
        let archived = memory.archived().await;
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].version.id, expired.id);
    }

    #[tokio::test]
    async fn test_archive_failure_does_not_fail_run() {
        let memory = Arc::new(MemoryStore::new());
        let expired = DataVersionBuilder::new(DataType::Market).days_old(45).build();
        memory.insert_version(&expired).await.unwrap();
        memory
            .set_failures(FailureConfig::fail_on_operation("archive_insert"))
            .await;

        let outcome = pipeline(&memory).run_single(DataType::Market).await;

        assert!(outcome.succeeded());
        assert!(memory.archived().await.is_empty());
        assert_single_active(&memory.versions().await, DataType::Market);
    }

    #[tokio::test]
    async fn test_log_append_failure_does_not_fail_run() {
        let memory = Arc::new(MemoryStore::with_failures(FailureConfig::fail_on_operation(
            "log_append",
        )));
        let outcome = pipeline(&memory).run_single(DataType::Community).await;
        assert!(outcome.succeeded());
        assert!(memory.logs().await.is_empty());
    }
}
