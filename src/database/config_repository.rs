use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::connection::DatabasePool;
use super::models::UpdateConfigRow;
use crate::models::{DataType, UpdateConfig};
use crate::store::{StoreResult, UpdateConfigRepository};

const CONFIG_SELECT: &str = r#"
    SELECT
        data_type,
        source,
        update_interval_minutes,
        retry_attempts,
        is_enabled,
        last_update,
        next_update
    FROM update_configs
"#;

const CONFIG_ORDER: &str =
    "ORDER BY array_position(ARRAY['trends', 'products', 'market', 'community', 'insights'], data_type)";

/// Repository for the `update_configs` table
pub struct PgUpdateConfigRepository {
    pool: DatabasePool,
}

impl PgUpdateConfigRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn decode_all(rows: Vec<UpdateConfigRow>) -> StoreResult<Vec<UpdateConfig>> {
    rows.into_iter().map(UpdateConfig::try_from).collect()
}

#[async_trait]
impl UpdateConfigRepository for PgUpdateConfigRepository {
    async fn enabled(&self) -> StoreResult<Vec<UpdateConfig>> {
        let rows = sqlx::query_as::<_, UpdateConfigRow>(&format!(
            "{CONFIG_SELECT} WHERE is_enabled {CONFIG_ORDER}"
        ))
        .fetch_all(&self.pool)
        .await?;

        decode_all(rows)
    }

    async fn all(&self) -> StoreResult<Vec<UpdateConfig>> {
        let rows = sqlx::query_as::<_, UpdateConfigRow>(&format!("{CONFIG_SELECT} {CONFIG_ORDER}"))
            .fetch_all(&self.pool)
            .await?;

        decode_all(rows)
    }

    async fn get(&self, data_type: DataType) -> StoreResult<Option<UpdateConfig>> {
        let row = sqlx::query_as::<_, UpdateConfigRow>(&format!(
            "{CONFIG_SELECT} WHERE data_type = $1"
        ))
        .bind(data_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(UpdateConfig::try_from).transpose()
    }

    async fn upsert(&self, config: &UpdateConfig) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO update_configs (
                data_type,
                source,
                update_interval_minutes,
                retry_attempts,
                is_enabled,
                last_update,
                next_update
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (data_type) DO UPDATE SET
                source = EXCLUDED.source,
                update_interval_minutes = EXCLUDED.update_interval_minutes,
                retry_attempts = EXCLUDED.retry_attempts,
                is_enabled = EXCLUDED.is_enabled,
                last_update = COALESCE(update_configs.last_update, EXCLUDED.last_update),
                next_update = COALESCE(update_configs.next_update, EXCLUDED.next_update)
            "#,
        )
        .bind(config.data_type.as_str())
        .bind(&config.source)
        .bind(config.update_interval_minutes)
        .bind(config.retry_attempts)
        .bind(config.is_enabled)
        .bind(config.last_update)
        .bind(config.next_update)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_updated(
        &self,
        data_type: DataType,
        last_update: DateTime<Utc>,
        next_update: DateTime<Utc>,
    ) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE update_configs
            SET last_update = $2, next_update = $3
            WHERE data_type = $1
            "#,
        )
        .bind(data_type.as_str())
        .bind(last_update)
        .bind(next_update)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
