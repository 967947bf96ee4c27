//! Test data builders for creating common test objects

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::factories::PayloadFactory;
use crate::models::{DataPayload, DataType, DataVersion, UpdateConfig};
use crate::versioning::version_label;

/// Builder for creating test DataVersion rows
#[derive(Debug, Clone)]
pub struct DataVersionBuilder {
    id: String,
    created_at: DateTime<Utc>,
    source: String,
    is_active: bool,
    payload: DataPayload,
}

impl DataVersionBuilder {
    /// Create an inactive version of `data_type` created now
    pub fn new(data_type: DataType) -> Self {
        Self {
            id: format!("{}-{}", data_type, Uuid::new_v4()),
            created_at: Utc::now(),
            source: "test".to_string(),
            is_active: false,
            payload: PayloadFactory::for_type(data_type),
        }
    }

    pub fn active(mut self) -> Self {
        self.is_active = true;
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn days_old(self, days: i64) -> Self {
        self.created_at(Utc::now() - Duration::days(days))
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn with_source(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }

    /// Build the DataVersion; the label follows the creation time
    pub fn build(self) -> DataVersion {
        DataVersion {
            id: self.id,
            version: version_label(self.created_at),
            created_at: self.created_at,
            source: self.source,
            is_active: self.is_active,
            payload: self.payload,
        }
    }
}

/// Builder for creating test UpdateConfig rows
#[derive(Debug, Clone)]
pub struct UpdateConfigBuilder {
    config: UpdateConfig,
}

impl UpdateConfigBuilder {
    pub fn new(data_type: DataType) -> Self {
        Self {
            config: UpdateConfig::default_for(data_type),
        }
    }

    pub fn interval_minutes(mut self, minutes: i32) -> Self {
        self.config.update_interval_minutes = minutes;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.config.is_enabled = false;
        self
    }

    /// Not due until `minutes` from now
    pub fn due_in(mut self, minutes: i64) -> Self {
        let now = Utc::now();
        self.config.last_update = Some(now);
        self.config.next_update = Some(now + Duration::minutes(minutes));
        self
    }

    /// Was due `minutes` ago
    pub fn overdue_by(mut self, minutes: i64) -> Self {
        let now = Utc::now();
        self.config.last_update = Some(now - self.config.interval() - Duration::minutes(minutes));
        self.config.next_update = Some(now - Duration::minutes(minutes));
        self
    }

    pub fn build(self) -> UpdateConfig {
        self.config
    }
}
