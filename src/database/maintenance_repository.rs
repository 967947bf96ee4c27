use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::connection::DatabasePool;
use crate::store::{CommunityStats, MemberActivity, QualityMetricsRepository, StoreResult};

/// Prunes `data_quality_metrics`
pub struct PgQualityMetricsRepository {
    pool: DatabasePool,
}

impl PgQualityMetricsRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QualityMetricsRepository for PgQualityMetricsRepository {
    async fn delete_before(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM data_quality_metrics WHERE created_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Reads the application's `users` and `predictions` tables
pub struct PgCommunityStats {
    pool: DatabasePool,
}

impl PgCommunityStats {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommunityStats for PgCommunityStats {
    async fn member_activity(&self, active_since: DateTime<Utc>) -> StoreResult<MemberActivity> {
        let (total_members, active_predictors): (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COUNT(*) FILTER (WHERE last_active > $1)
            FROM users
            "#,
        )
        .bind(active_since)
        .fetch_one(&self.pool)
        .await?;

        Ok(MemberActivity {
            total_members,
            active_predictors,
        })
    }

    async fn prediction_accuracies(&self) -> StoreResult<Vec<f64>> {
        let accuracies = sqlx::query_scalar::<_, f64>(
            "SELECT accuracy FROM predictions WHERE accuracy IS NOT NULL",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(accuracies)
    }
}
