//! Storage seams for the versioning pipeline
//!
//! Every table the pipeline touches sits behind a small async trait so the
//! Postgres repositories and the in-memory backend are interchangeable.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::StoreError;
use crate::models::{
    ArchivedDataVersion, DataType, DataVersion, NewUpdateLog, UpdateConfig, UpdateLog,
};

pub use memory::{FailureConfig, MemoryStore};

pub type StoreResult<T> = Result<T, StoreError>;

/// Live `data_versions` table
#[async_trait]
pub trait VersionRepository: Send + Sync {
    /// Clears the active flag on every active version of `data_type`.
    ///
    /// With `insert_version`, the building block of the default
    /// `replace_active` for backends without transactions.
    async fn deactivate_active(&self, data_type: DataType) -> StoreResult<u64>;

    async fn insert_version(&self, version: &DataVersion) -> StoreResult<()>;

    /// Makes `version` the only active version of its data type.
    ///
    /// The default runs deactivate then insert as two separate writes. A
    /// failed deactivate aborts before the insert; a failed insert leaves the
    /// data type with no active version. Backends with transactions override
    /// this to apply both writes atomically.
    async fn replace_active(&self, version: &DataVersion) -> StoreResult<u64> {
        let deactivated = self.deactivate_active(version.data_type()).await?;
        self.insert_version(version).await?;
        Ok(deactivated)
    }

    /// Newest active version; breaks ties when a race left more than one
    async fn active_version(&self, data_type: DataType) -> StoreResult<Option<DataVersion>>;

    /// Versions of `data_type`, newest first
    async fn history(&self, data_type: DataType, limit: i64) -> StoreResult<Vec<DataVersion>>;

    /// Inactive versions created before `cutoff`
    async fn expired_inactive(
        &self,
        data_type: DataType,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<Vec<DataVersion>>;

    async fn delete_versions(&self, ids: &[String]) -> StoreResult<u64>;
}

/// Cold `data_archive` table
#[async_trait]
pub trait ArchiveRepository: Send + Sync {
    async fn insert_archived(&self, versions: &[ArchivedDataVersion]) -> StoreResult<u64>;

    async fn purge_archived_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64>;

    async fn count_by_type(&self) -> StoreResult<BTreeMap<String, i64>>;
}

/// Append-only `update_logs` table
#[async_trait]
pub trait UpdateLogRepository: Send + Sync {
    async fn append(&self, log: NewUpdateLog) -> StoreResult<UpdateLog>;

    /// Most recent entries, optionally restricted to one data type or scope
    async fn recent(&self, scope: Option<&str>, limit: i64) -> StoreResult<Vec<UpdateLog>>;

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64>;
}

/// `update_configs` table
#[async_trait]
pub trait UpdateConfigRepository: Send + Sync {
    async fn enabled(&self) -> StoreResult<Vec<UpdateConfig>>;

    async fn all(&self) -> StoreResult<Vec<UpdateConfig>>;

    async fn get(&self, data_type: DataType) -> StoreResult<Option<UpdateConfig>>;

    /// Inserts or replaces the policy fields, keeping recorded timestamps
    async fn upsert(&self, config: &UpdateConfig) -> StoreResult<()>;

    async fn mark_updated(
        &self,
        data_type: DataType,
        last_update: DateTime<Utc>,
        next_update: DateTime<Utc>,
    ) -> StoreResult<()>;
}

/// `data_quality_metrics` table; only pruned by this service
#[async_trait]
pub trait QualityMetricsRepository: Send + Sync {
    async fn delete_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64>;
}

/// Member counts used by the community aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberActivity {
    pub total_members: i64,
    pub active_predictors: i64,
}

/// Live user and prediction data owned by the wider application
#[async_trait]
pub trait CommunityStats: Send + Sync {
    async fn member_activity(&self, active_since: DateTime<Utc>) -> StoreResult<MemberActivity>;

    async fn prediction_accuracies(&self) -> StoreResult<Vec<f64>>;
}

/// Handle bundling one repository per table
#[derive(Clone)]
pub struct Store {
    pub versions: Arc<dyn VersionRepository>,
    pub archive: Arc<dyn ArchiveRepository>,
    pub logs: Arc<dyn UpdateLogRepository>,
    pub configs: Arc<dyn UpdateConfigRepository>,
    pub quality_metrics: Arc<dyn QualityMetricsRepository>,
    pub community: Arc<dyn CommunityStats>,
}

impl Store {
    /// Backs every repository with the same in-memory tables
    pub fn memory(store: Arc<MemoryStore>) -> Self {
        Self {
            versions: store.clone(),
            archive: store.clone(),
            logs: store.clone(),
            configs: store.clone(),
            quality_metrics: store.clone(),
            community: store,
        }
    }
}
