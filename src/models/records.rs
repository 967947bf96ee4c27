use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::data_type::DataType;
use super::payload::DataPayload;

/// Pseudo data type used by cleanup runs in `update_logs`
pub const ARCHIVE_CLEANUP_SCOPE: &str = "archive_cleanup";

/// Pseudo data type used by the initial setup in `update_logs`
pub const SYSTEM_SETUP_SCOPE: &str = "system_setup";

/// One immutable snapshot of a data type's content
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataVersion {
    pub id: String,
    /// Label of the form `vYY.MM.DD.HH`
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub source: String,
    pub is_active: bool,
    #[serde(flatten)]
    pub payload: DataPayload,
}

impl DataVersion {
    pub fn data_type(&self) -> DataType {
        self.payload.data_type()
    }
}

/// A retention-expired version moved into `data_archive`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedDataVersion {
    #[serde(flatten)]
    pub version: DataVersion,
    pub archived_at: DateTime<Utc>,
}

/// Per data type scheduling policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfig {
    pub data_type: DataType,
    pub source: String,
    pub update_interval_minutes: i32,
    pub retry_attempts: i32,
    pub is_enabled: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub next_update: Option<DateTime<Utc>>,
}

impl UpdateConfig {
    /// Built-in policy for a data type, due immediately
    pub fn default_for(data_type: DataType) -> Self {
        Self {
            data_type,
            source: data_type.default_config_source().to_string(),
            update_interval_minutes: data_type.default_interval_minutes(),
            retry_attempts: data_type.default_retry_attempts(),
            is_enabled: true,
            last_update: None,
            next_update: None,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::minutes(i64::from(self.update_interval_minutes))
    }

    /// A config with no `next_update` is always due
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.next_update {
            Some(next) => next <= now,
            None => true,
        }
    }
}

/// Outcome classification shared by update runs, batches and cleanups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failed,
    Partial,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
            RunStatus::Partial => "partial",
        }
    }

    /// Folds success/failure counts into one status
    pub fn from_counts(succeeded: usize, failed: usize) -> Self {
        match (succeeded, failed) {
            (_, 0) => RunStatus::Success,
            (0, _) => RunStatus::Failed,
            _ => RunStatus::Partial,
        }
    }
}

/// Append-only audit record of one pipeline or maintenance run
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLog {
    pub id: i64,
    /// A data type name or a pseudo scope such as `archive_cleanup`
    pub data_type: String,
    pub status: String,
    pub message: String,
    pub execution_time: i64,
    pub records_updated: i64,
    pub error_details: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// Parameters for appending an update log entry
#[derive(Debug, Clone)]
pub struct NewUpdateLog {
    pub data_type: String,
    pub status: RunStatus,
    pub message: String,
    pub execution_time_ms: i64,
    pub records_updated: i64,
    pub error_details: Option<Value>,
}

impl NewUpdateLog {
    pub fn new(data_type: impl Into<String>, status: RunStatus, message: impl Into<String>) -> Self {
        Self {
            data_type: data_type.into(),
            status,
            message: message.into(),
            execution_time_ms: 0,
            records_updated: 0,
            error_details: None,
        }
    }

    pub fn with_execution_time(mut self, millis: i64) -> Self {
        self.execution_time_ms = millis;
        self
    }

    pub fn with_records(mut self, records: i64) -> Self {
        self.records_updated = records;
        self
    }

    pub fn with_error(mut self, details: Value) -> Self {
        self.error_details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_due_check() {
        let now = Utc::now();
        let mut config = UpdateConfig::default_for(DataType::Trends);
        assert!(config.is_due(now));

        config.next_update = Some(now + Duration::minutes(5));
        assert!(!config.is_due(now));

        config.next_update = Some(now - Duration::seconds(1));
        assert!(config.is_due(now));

        config.next_update = Some(now);
        assert!(config.is_due(now));
    }

    #[test]
    fn test_config_interval() {
        let config = UpdateConfig::default_for(DataType::Products);
        assert_eq!(config.interval(), Duration::hours(4));
        assert_eq!(config.source, "product-api");
    }

    #[test]
    fn test_status_from_counts() {
        assert_eq!(RunStatus::from_counts(3, 0), RunStatus::Success);
        assert_eq!(RunStatus::from_counts(0, 0), RunStatus::Success);
        assert_eq!(RunStatus::from_counts(0, 2), RunStatus::Failed);
        assert_eq!(RunStatus::from_counts(2, 1), RunStatus::Partial);
    }

    #[test]
    fn test_new_update_log_builder() {
        let log = NewUpdateLog::new("trends", RunStatus::Failed, "Update failed")
            .with_execution_time(120)
            .with_error(json!({"error": "boom"}));

        assert_eq!(log.data_type, "trends");
        assert_eq!(log.status.as_str(), "failed");
        assert_eq!(log.execution_time_ms, 120);
        assert_eq!(log.records_updated, 0);
        assert_eq!(log.error_details.unwrap()["error"], "boom");
    }
}
