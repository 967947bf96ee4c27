use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::connection::DatabasePool;
use super::models::DataVersionRow;
use crate::models::{DataType, DataVersion};
use crate::store::{StoreResult, VersionRepository};

const VERSION_COLUMNS: &str = "id, version, created_at, data_type, data, source, is_active";

const DEACTIVATE_ACTIVE: &str = r#"
    UPDATE data_versions
    SET is_active = FALSE
    WHERE data_type = $1 AND is_active
"#;

const INSERT_VERSION: &str = r#"
    INSERT INTO data_versions (id, version, created_at, data_type, data, source, is_active)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
"#;

/// Repository for the `data_versions` table
pub struct PgVersionRepository {
    pool: DatabasePool,
}

impl PgVersionRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn decode_all(rows: Vec<DataVersionRow>) -> StoreResult<Vec<DataVersion>> {
    rows.into_iter().map(DataVersion::try_from).collect()
}

#[async_trait]
impl VersionRepository for PgVersionRepository {
    async fn deactivate_active(&self, data_type: DataType) -> StoreResult<u64> {
        let result = sqlx::query(DEACTIVATE_ACTIVE)
            .bind(data_type.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn insert_version(&self, version: &DataVersion) -> StoreResult<()> {
        let data = version.payload.to_json()?;
        sqlx::query(INSERT_VERSION)
            .bind(&version.id)
            .bind(&version.version)
            .bind(version.created_at)
            .bind(version.data_type().as_str())
            .bind(data)
            .bind(&version.source)
            .bind(version.is_active)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Deactivate and insert in one transaction
    async fn replace_active(&self, version: &DataVersion) -> StoreResult<u64> {
        let data = version.payload.to_json()?;
        let mut tx = self.pool.begin().await?;

        let deactivated = sqlx::query(DEACTIVATE_ACTIVE)
            .bind(version.data_type().as_str())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query(INSERT_VERSION)
            .bind(&version.id)
            .bind(&version.version)
            .bind(version.created_at)
            .bind(version.data_type().as_str())
            .bind(data)
            .bind(&version.source)
            .bind(true)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(
            "Replaced active {} version with {} ({} deactivated)",
            version.data_type(),
            version.id,
            deactivated
        );
        Ok(deactivated)
    }

    async fn active_version(&self, data_type: DataType) -> StoreResult<Option<DataVersion>> {
        let row = sqlx::query_as::<_, DataVersionRow>(&format!(
            r#"
            SELECT {VERSION_COLUMNS}
            FROM data_versions
            WHERE data_type = $1 AND is_active
            ORDER BY created_at DESC
            LIMIT 1
            "#
        ))
        .bind(data_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(DataVersion::try_from).transpose()
    }

    async fn history(&self, data_type: DataType, limit: i64) -> StoreResult<Vec<DataVersion>> {
        let rows = sqlx::query_as::<_, DataVersionRow>(&format!(
            r#"
            SELECT {VERSION_COLUMNS}
            FROM data_versions
            WHERE data_type = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#
        ))
        .bind(data_type.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        decode_all(rows)
    }

    async fn expired_inactive(
        &self,
        data_type: DataType,
        cutoff: DateTime<Utc>,
    ) -> StoreResult<Vec<DataVersion>> {
        let rows = sqlx::query_as::<_, DataVersionRow>(&format!(
            r#"
            SELECT {VERSION_COLUMNS}
            FROM data_versions
            WHERE data_type = $1 AND NOT is_active AND created_at < $2
            ORDER BY created_at ASC
            "#
        ))
        .bind(data_type.as_str())
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        decode_all(rows)
    }

    async fn delete_versions(&self, ids: &[String]) -> StoreResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM data_versions WHERE id = ANY($1)")
            .bind(ids.to_vec())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_active_shares_single_write_statements() {
        assert!(DEACTIVATE_ACTIVE.contains("SET is_active = FALSE"));
        assert!(DEACTIVATE_ACTIVE.contains("WHERE data_type = $1 AND is_active"));
        assert!(INSERT_VERSION.contains("$7"));
        assert!(!INSERT_VERSION.contains("TRUE"));
    }
}
