use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::FromRow;

use crate::error::StoreError;
use crate::models::{DataPayload, DataType, DataVersion, UpdateConfig};

/// Raw `data_versions` row
#[derive(Debug, Clone, FromRow)]
pub struct DataVersionRow {
    pub id: String,
    pub version: String,
    pub created_at: DateTime<Utc>,
    pub data_type: String,
    pub data: Value,
    pub source: String,
    pub is_active: bool,
}

fn parse_data_type(entity: &'static str, raw: &str) -> Result<DataType, StoreError> {
    raw.parse().map_err(|e| StoreError::decode(entity, e))
}

impl TryFrom<DataVersionRow> for DataVersion {
    type Error = StoreError;

    fn try_from(row: DataVersionRow) -> Result<Self, Self::Error> {
        let data_type = parse_data_type("data_versions", &row.data_type)?;
        let payload = DataPayload::from_json(data_type, row.data).map_err(|e| {
            StoreError::decode("data_versions", format!("version {}: {}", row.id, e))
        })?;

        Ok(DataVersion {
            id: row.id,
            version: row.version,
            created_at: row.created_at,
            source: row.source,
            is_active: row.is_active,
            payload,
        })
    }
}

/// Raw `update_configs` row
#[derive(Debug, Clone, FromRow)]
pub struct UpdateConfigRow {
    pub data_type: String,
    pub source: String,
    pub update_interval_minutes: i32,
    pub retry_attempts: i32,
    pub is_enabled: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub next_update: Option<DateTime<Utc>>,
}

impl TryFrom<UpdateConfigRow> for UpdateConfig {
    type Error = StoreError;

    fn try_from(row: UpdateConfigRow) -> Result<Self, Self::Error> {
        Ok(UpdateConfig {
            data_type: parse_data_type("update_configs", &row.data_type)?,
            source: row.source,
            update_interval_minutes: row.update_interval_minutes,
            retry_attempts: row.retry_attempts,
            is_enabled: row.is_enabled,
            last_update: row.last_update,
            next_update: row.next_update,
        })
    }
}
