//! In-process backend for local runs and tests
//!
//! Mirrors the Postgres tables with plain vectors behind a lock. Writes are not
//! transactional, so `replace_active` keeps the two-step default and failures
//! can be injected per operation through [`FailureConfig`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;

use super::{
    ArchiveRepository, CommunityStats, MemberActivity, QualityMetricsRepository, StoreResult,
    UpdateConfigRepository, UpdateLogRepository, VersionRepository,
};
use crate::error::StoreError;
use crate::models::{
    ArchivedDataVersion, DataType, DataVersion, NewUpdateLog, UpdateConfig, UpdateLog,
};

/// Controls which operations of a [`MemoryStore`] fail
#[derive(Debug, Clone, Default)]
pub struct FailureConfig {
    pub fail_on_deactivate: bool,
    pub fail_on_insert_version: bool,
    pub fail_on_read_versions: bool,
    pub fail_on_archive_insert: bool,
    pub fail_on_delete_versions: bool,
    pub fail_on_archive_purge: bool,
    pub fail_on_log_append: bool,
    pub fail_on_log_prune: bool,
    pub fail_on_config_read: bool,
    pub fail_on_config_write: bool,
    pub fail_on_metrics_prune: bool,
    pub fail_on_community: bool,
}

impl FailureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_all() -> Self {
        Self {
            fail_on_deactivate: true,
            fail_on_insert_version: true,
            fail_on_read_versions: true,
            fail_on_archive_insert: true,
            fail_on_delete_versions: true,
            fail_on_archive_purge: true,
            fail_on_log_append: true,
            fail_on_log_prune: true,
            fail_on_config_read: true,
            fail_on_config_write: true,
            fail_on_metrics_prune: true,
            fail_on_community: true,
        }
    }

    pub fn fail_on_operation(operation: &str) -> Self {
        let mut config = Self::default();
        match operation {
            "deactivate" => config.fail_on_deactivate = true,
            "insert_version" => config.fail_on_insert_version = true,
            "read_versions" => config.fail_on_read_versions = true,
            "archive_insert" => config.fail_on_archive_insert = true,
            "delete_versions" => config.fail_on_delete_versions = true,
            "archive_purge" => config.fail_on_archive_purge = true,
            "log_append" => config.fail_on_log_append = true,
            "log_prune" => config.fail_on_log_prune = true,
            "config_read" => config.fail_on_config_read = true,
            "config_write" => config.fail_on_config_write = true,
            "metrics_prune" => config.fail_on_metrics_prune = true,
            "community" => config.fail_on_community = true,
            _ => {}
        }
        config
    }
}

#[derive(Debug, Default)]
struct Tables {
    versions: Vec<DataVersion>,
    archive: Vec<ArchivedDataVersion>,
    logs: Vec<UpdateLog>,
    next_log_id: i64,
    configs: BTreeMap<DataType, UpdateConfig>,
    quality_metrics: Vec<DateTime<Utc>>,
    member_last_active: Vec<DateTime<Utc>>,
    prediction_accuracies: Vec<f64>,
    #[cfg(test)]
    journal: Vec<&'static str>,
}

/// Vector-backed implementation of every storage trait
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    failures: RwLock<FailureConfig>,
}

fn injected(operation: &str) -> StoreError {
    StoreError::Backend(format!("injected failure on {operation}"))
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failures(failures: FailureConfig) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            failures: RwLock::new(failures),
        }
    }

    pub async fn set_failures(&self, failures: FailureConfig) {
        *self.failures.write().await = failures;
    }

    async fn check(&self, operation: &'static str, select: fn(&FailureConfig) -> bool) -> StoreResult<()> {
        if select(&*self.failures.read().await) {
            return Err(injected(operation));
        }
        Ok(())
    }

    /// Records a quality metric row created at `created_at`
    pub async fn add_quality_metric(&self, created_at: DateTime<Utc>) {
        self.tables.write().await.quality_metrics.push(created_at);
    }

    pub async fn quality_metric_count(&self) -> usize {
        self.tables.read().await.quality_metrics.len()
    }

    /// Registers an application user last seen at `last_active`
    pub async fn add_member(&self, last_active: DateTime<Utc>) {
        self.tables.write().await.member_last_active.push(last_active);
    }

    pub async fn add_prediction(&self, accuracy: f64) {
        self.tables.write().await.prediction_accuracies.push(accuracy);
    }

    /// Inserts a log row with an explicit creation time
    pub async fn insert_log_at(&self, log: NewUpdateLog, created_at: DateTime<Utc>) -> UpdateLog {
        let mut tables = self.tables.write().await;
        tables.next_log_id += 1;
        let record = UpdateLog {
            id: tables.next_log_id,
            data_type: log.data_type,
            status: log.status.as_str().to_string(),
            message: log.message,
            execution_time: log.execution_time_ms,
            records_updated: log.records_updated,
            error_details: log.error_details,
            created_at,
        };
        tables.logs.push(record.clone());
        record
    }

    pub async fn versions(&self) -> Vec<DataVersion> {
        self.tables.read().await.versions.clone()
    }

    pub async fn archived(&self) -> Vec<ArchivedDataVersion> {
        self.tables.read().await.archive.clone()
    }

    pub async fn logs(&self) -> Vec<UpdateLog> {
        self.tables.read().await.logs.clone()
    }

    /// Names of the successful writes, in the order they were applied
    #[cfg(test)]
    pub async fn journal(&self) -> Vec<&'static str> {
        self.tables.read().await.journal.clone()
    }
}

#[async_trait]
impl VersionRepository for MemoryStore {
    async fn deactivate_active(&self, data_type: DataType) -> StoreResult<u64> {
        self.check("deactivate", |f| f.fail_on_deactivate).await?;
        let mut tables = self.tables.write().await;
        let mut changed = 0;
        for version in tables
            .versions
            .iter_mut()
            .filter(|v| v.is_active && v.data_type() == data_type)
        {
            version.is_active = false;
            changed += 1;
        }
        #[cfg(test)]
        tables.journal.push("deactivate");
        Ok(changed)
    }

    async fn insert_version(&self, version: &DataVersion) -> StoreResult<()> {
        self.check("insert_version", |f| f.fail_on_insert_version).await?;
        let mut tables = self.tables.write().await;
        if tables.versions.iter().any(|v| v.id == version.id) {
            return Err(StoreError::Backend(format!(
                "duplicate version id '{}'",
                version.id
            )));
        }
        tables.versions.push(version.clone());
        #[cfg(test)]
        tables.journal.push("insert_version");
        Ok(())
    }

    async fn active_version(&self, data_type: DataType) -> StoreResult<Option<DataVersion>> {
        self.check("read_versions", |f| f.fail_on_read_versions).await?;
        let tables = self.tables.read().await;
        Ok(tables
            .versions
            .iter()
            .filter(|v| v.is_active && v.data_type() == data_type)
            .max_by_key(|v| v.created_at)
            .cloned())
    }

    async fn history(&self, data_type: DataType, limit: i64) -> StoreResult<Vec<DataVersion>> {
        self.check("read_versions", |f| f.fail_on_read_versions).await?;
        let tables = self.tables.read().await;
        let mut versions: Vec<DataVersion> = tables
            .versions
            .iter()
            .filter(|v| v.data_type() == data_type)
            .cloned()
            .collect();
        versions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        versions.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(versions)
    }

    async fn expired_inactive(
        &self,
        data_type: DataType,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<Vec<DataVersion>> {
        self.check("read_versions", |f| f.fail_on_read_versions).await?;
        let tables = self.tables.read().await;
        Ok(tables
            .versions
            .iter()
            .filter(|v| !v.is_active && v.data_type() == data_type && v.created_at < cutoff)
            .cloned()
            .collect())
    }

    async fn delete_versions(&self, ids: &[String]) -> StoreResult<u64> {
        self.check("delete_versions", |f| f.fail_on_delete_versions).await?;
        let ids: HashSet<&String> = ids.iter().collect();
        let mut tables = self.tables.write().await;
        let before = tables.versions.len();
        tables.versions.retain(|v| !ids.contains(&v.id));
        let deleted = (before - tables.versions.len()) as u64;
        #[cfg(test)]
        tables.journal.push("delete_versions");
        Ok(deleted)
    }
}

#[async_trait]
impl ArchiveRepository for MemoryStore {
    async fn insert_archived(&self, versions: &[ArchivedDataVersion]) -> StoreResult<u64> {
        self.check("archive_insert", |f| f.fail_on_archive_insert).await?;
        let mut tables = self.tables.write().await;
        tables.archive.extend_from_slice(versions);
        #[cfg(test)]
        tables.journal.push("archive_insert");
        Ok(versions.len() as u64)
    }

    async fn purge_archived_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        self.check("archive_purge", |f| f.fail_on_archive_purge).await?;
        let mut tables = self.tables.write().await;
        let before = tables.archive.len();
        tables.archive.retain(|a| a.archived_at >= cutoff);
        Ok((before - tables.archive.len()) as u64)
    }

    async fn count_by_type(&self) -> StoreResult<BTreeMap<String, i64>> {
        let tables = self.tables.read().await;
        let mut counts = BTreeMap::new();
        for archived in &tables.archive {
            *counts
                .entry(archived.version.data_type().to_string())
                .or_insert(0) += 1;
        }
        Ok(counts)
    }
}

#[async_trait]
impl UpdateLogRepository for MemoryStore {
    async fn append(&self, log: NewUpdateLog) -> StoreResult<UpdateLog> {
        self.check("log_append", |f| f.fail_on_log_append).await?;
        Ok(self.insert_log_at(log, Utc::now()).await)
    }

    async fn recent(&self, scope: Option<&str>, limit: i64) -> StoreResult<Vec<UpdateLog>> {
        let tables = self.tables.read().await;
        let mut logs: Vec<UpdateLog> = tables
            .logs
            .iter()
            .filter(|log| scope.map_or(true, |s| log.data_type == s))
            .cloned()
            .collect();
        logs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        logs.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(logs)
    }

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        self.check("log_prune", |f| f.fail_on_log_prune).await?;
        let mut tables = self.tables.write().await;
        let before = tables.logs.len();
        tables.logs.retain(|log| log.created_at >= cutoff);
        Ok((before - tables.logs.len()) as u64)
    }
}

#[async_trait]
impl UpdateConfigRepository for MemoryStore {
    async fn enabled(&self) -> StoreResult<Vec<UpdateConfig>> {
        self.check("config_read", |f| f.fail_on_config_read).await?;
        let tables = self.tables.read().await;
        Ok(tables
            .configs
            .values()
            .filter(|c| c.is_enabled)
            .cloned()
            .collect())
    }

    async fn all(&self) -> StoreResult<Vec<UpdateConfig>> {
        self.check("config_read", |f| f.fail_on_config_read).await?;
        Ok(self.tables.read().await.configs.values().cloned().collect())
    }

    async fn get(&self, data_type: DataType) -> StoreResult<Option<UpdateConfig>> {
        self.check("config_read", |f| f.fail_on_config_read).await?;
        Ok(self.tables.read().await.configs.get(&data_type).cloned())
    }

    async fn upsert(&self, config: &UpdateConfig) -> StoreResult<()> {
        self.check("config_write", |f| f.fail_on_config_write).await?;
        let mut tables = self.tables.write().await;
        let mut updated = config.clone();
        if let Some(existing) = tables.configs.get(&config.data_type) {
            updated.last_update = existing.last_update.or(config.last_update);
            updated.next_update = existing.next_update.or(config.next_update);
        }
        tables.configs.insert(config.data_type, updated);
        Ok(())
    }

    async fn mark_updated(
        &self,
        data_type: DataType,
        last_update: DateTime<Utc>,
        next_update: DateTime<Utc>,
    ) -> StoreResult<()> {
        self.check("config_write", |f| f.fail_on_config_write).await?;
        let mut tables = self.tables.write().await;
        if let Some(config) = tables.configs.get_mut(&data_type) {
            config.last_update = Some(last_update);
            config.next_update = Some(next_update);
        }
        Ok(())
    }
}

#[async_trait]
impl QualityMetricsRepository for MemoryStore {
    async fn delete_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        self.check("metrics_prune", |f| f.fail_on_metrics_prune).await?;
        let mut tables = self.tables.write().await;
        let before = tables.quality_metrics.len();
        tables.quality_metrics.retain(|created_at| *created_at >= cutoff);
        Ok((before - tables.quality_metrics.len()) as u64)
    }
}

#[async_trait]
impl CommunityStats for MemoryStore {
    async fn member_activity(&self, active_since: DateTime<Utc>) -> StoreResult<MemberActivity> {
        self.check("community", |f| f.fail_on_community).await?;
        let tables = self.tables.read().await;
        Ok(MemberActivity {
            total_members: tables.member_last_active.len() as i64,
            active_predictors: tables
                .member_last_active
                .iter()
                .filter(|last_active| **last_active > active_since)
                .count() as i64,
        })
    }

    async fn prediction_accuracies(&self) -> StoreResult<Vec<f64>> {
        self.check("community", |f| f.fail_on_community).await?;
        Ok(self.tables.read().await.prediction_accuracies.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunStatus;
    use crate::test_utils::DataVersionBuilder;
    use chrono::Duration;

    #[tokio::test]
    async fn test_replace_active_default_is_two_steps() {
        let store = MemoryStore::new();
        let first = DataVersionBuilder::new(DataType::Trends).active().build();
        store.insert_version(&first).await.unwrap();

        let second = DataVersionBuilder::new(DataType::Trends).active().build();
        let deactivated = store.replace_active(&second).await.unwrap();

        assert_eq!(deactivated, 1);
        assert_eq!(
            store.journal().await,
            vec!["insert_version", "deactivate", "insert_version"]
        );
        let active = store.active_version(DataType::Trends).await.unwrap().unwrap();
        assert_eq!(active.id, second.id);
    }

    #[tokio::test]
    async fn test_failed_deactivate_skips_insert() {
        let store = MemoryStore::with_failures(FailureConfig::fail_on_operation("deactivate"));
        let version = DataVersionBuilder::new(DataType::Market).active().build();

        assert!(store.replace_active(&version).await.is_err());
        assert!(store.versions().await.is_empty());
    }

    #[tokio::test]
    async fn test_active_version_prefers_newest() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let older = DataVersionBuilder::new(DataType::Products)
            .active()
            .created_at(now - Duration::minutes(10))
            .build();
        let newer = DataVersionBuilder::new(DataType::Products)
            .active()
            .created_at(now)
            .build();
        store.insert_version(&older).await.unwrap();
        store.insert_version(&newer).await.unwrap();

        let active = store.active_version(DataType::Products).await.unwrap().unwrap();
        assert_eq!(active.id, newer.id);
    }

    #[tokio::test]
    async fn test_recent_logs_filter_and_order() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store
            .insert_log_at(NewUpdateLog::new("trends", RunStatus::Success, "a"), now - Duration::hours(2))
            .await;
        store
            .insert_log_at(NewUpdateLog::new("archive_cleanup", RunStatus::Success, "b"), now - Duration::hours(1))
            .await;
        store
            .insert_log_at(NewUpdateLog::new("trends", RunStatus::Failed, "c"), now)
            .await;

        let all = store.recent(None, 10).await.unwrap();
        assert_eq!(all.iter().map(|l| l.message.as_str()).collect::<Vec<_>>(), vec!["c", "b", "a"]);

        let cleanups = store.recent(Some("archive_cleanup"), 10).await.unwrap();
        assert_eq!(cleanups.len(), 1);
        assert_eq!(cleanups[0].message, "b");

        let limited = store.recent(None, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_keeps_recorded_timestamps() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.upsert(&UpdateConfig::default_for(DataType::Trends)).await.unwrap();
        store
            .mark_updated(DataType::Trends, now, now + Duration::hours(1))
            .await
            .unwrap();

        let mut changed = UpdateConfig::default_for(DataType::Trends);
        changed.update_interval_minutes = 15;
        store.upsert(&changed).await.unwrap();

        let config = store.get(DataType::Trends).await.unwrap().unwrap();
        assert_eq!(config.update_interval_minutes, 15);
        assert_eq!(config.last_update, Some(now));
        assert_eq!(config.next_update, Some(now + Duration::hours(1)));
    }

    #[tokio::test]
    async fn test_member_activity_window() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store.add_member(now - Duration::days(2)).await;
        store.add_member(now - Duration::days(45)).await;

        let activity = store.member_activity(now - Duration::days(30)).await.unwrap();
        assert_eq!(activity.total_members, 2);
        assert_eq!(activity.active_predictors, 1);
    }
}
