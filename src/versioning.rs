use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{DataPayload, DataType, DataVersion};
use crate::store::VersionRepository;

/// Formats the `vYY.MM.DD.HH` label for a creation time
pub fn version_label(at: DateTime<Utc>) -> String {
    at.format("v%y.%m.%d.%H").to_string()
}

/// Produces labels that never go backwards within one process, even if the
/// wall clock does. Labels repeat within the same hour.
#[derive(Debug, Default)]
pub struct VersionLabeler {
    last: Mutex<Option<String>>,
}

impl VersionLabeler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self, at: DateTime<Utc>) -> String {
        let candidate = version_label(at);
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let label = match last.as_ref() {
            Some(previous) if *previous > candidate => previous.clone(),
            _ => candidate,
        };
        *last = Some(label.clone());
        label
    }
}

/// Persists aggregations as immutable versions with one active row per type
#[derive(Clone)]
pub struct VersionStore {
    versions: Arc<dyn VersionRepository>,
    labeler: Arc<VersionLabeler>,
}

impl VersionStore {
    pub fn new(versions: Arc<dyn VersionRepository>) -> Self {
        Self {
            versions,
            labeler: Arc::new(VersionLabeler::new()),
        }
    }

    /// Stores `payload` as the new active version of its data type.
    ///
    /// The previous active version is deactivated before the insert. If the
    /// deactivation fails nothing is inserted; if the insert fails the data
    /// type is left without an active version until the next commit.
    pub async fn commit(&self, payload: DataPayload, source: &str) -> Result<DataVersion, StoreError> {
        let data_type = payload.data_type();
        let now = Utc::now();
        let version = DataVersion {
            id: format!("{}-{}", data_type, Uuid::new_v4()),
            version: self.labeler.next(now),
            created_at: now,
            source: source.to_string(),
            is_active: true,
            payload,
        };

        debug!(
            "Committing {} version {} (id={}, source={})",
            data_type, version.version, version.id, source
        );

        let deactivated = self.versions.replace_active(&version).await?;

        info!(
            "Committed {} version {} (id={}), deactivated {} previous version(s)",
            data_type, version.version, version.id, deactivated
        );

        Ok(version)
    }

    pub async fn current(&self, data_type: DataType) -> Result<Option<DataVersion>, StoreError> {
        self.versions.active_version(data_type).await
    }

    pub async fn history(&self, data_type: DataType, limit: i64) -> Result<Vec<DataVersion>, StoreError> {
        self.versions.history(data_type, limit).await
    }
}
