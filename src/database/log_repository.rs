use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::connection::DatabasePool;
use crate::models::{NewUpdateLog, UpdateLog};
use crate::store::{StoreResult, UpdateLogRepository};

/// Repository for the `update_logs` table
pub struct PgUpdateLogRepository {
    pool: DatabasePool,
}

impl PgUpdateLogRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UpdateLogRepository for PgUpdateLogRepository {
    async fn append(&self, log: NewUpdateLog) -> StoreResult<UpdateLog> {
        let record = sqlx::query_as::<_, UpdateLog>(
            r#"
            INSERT INTO update_logs (
                data_type,
                status,
                message,
                execution_time,
                records_updated,
                error_details
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING
                id,
                data_type,
                status,
                message,
                execution_time,
                records_updated,
                error_details,
                created_at
            "#,
        )
        .bind(&log.data_type)
        .bind(log.status.as_str())
        .bind(&log.message)
        .bind(log.execution_time_ms)
        .bind(log.records_updated)
        .bind(&log.error_details)
        .fetch_one(&self.pool)
        .await?;

        debug!(
            "Saved update log id={}: {} {}",
            record.id, record.data_type, record.status
        );

        Ok(record)
    }

    async fn recent(&self, scope: Option<&str>, limit: i64) -> StoreResult<Vec<UpdateLog>> {
        let records = sqlx::query_as::<_, UpdateLog>(
            r#"
            SELECT
                id,
                data_type,
                status,
                message,
                execution_time,
                records_updated,
                error_details,
                created_at
            FROM update_logs
            WHERE $1::TEXT IS NULL OR data_type = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(scope)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn delete_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM update_logs WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
