use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::connection::DatabasePool;
use crate::models::ArchivedDataVersion;
use crate::store::{ArchiveRepository, StoreResult};

/// Repository for the `data_archive` table
pub struct PgArchiveRepository {
    pool: DatabasePool,
}

impl PgArchiveRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArchiveRepository for PgArchiveRepository {
    /// Copies all rows in one transaction; re-archiving an id refreshes its
    /// `archived_at` instead of failing
    async fn insert_archived(&self, versions: &[ArchivedDataVersion]) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for archived in versions {
            let version = &archived.version;
            inserted += sqlx::query(
                r#"
                INSERT INTO data_archive
                    (id, version, created_at, data_type, data, source, is_active, archived_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ON CONFLICT (id) DO UPDATE SET archived_at = EXCLUDED.archived_at
                "#,
            )
            .bind(&version.id)
            .bind(&version.version)
            .bind(version.created_at)
            .bind(version.data_type().as_str())
            .bind(version.payload.to_json()?)
            .bind(&version.source)
            .bind(version.is_active)
            .bind(archived.archived_at)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn purge_archived_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM data_archive WHERE archived_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn count_by_type(&self) -> StoreResult<BTreeMap<String, i64>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT data_type, COUNT(*)
            FROM data_archive
            GROUP BY data_type
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}
