pub mod archive_repository;
pub mod config_repository;
pub mod connection;
pub mod log_repository;
pub mod maintenance_repository;
pub mod models;
pub mod version_repository;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use crate::store::Store;

pub use archive_repository::PgArchiveRepository;
pub use config_repository::PgUpdateConfigRepository;
pub use connection::{
    establish_connections, mask_database_url, run_migrations, DatabasePool, DatabasePools,
    DatabaseUrls,
};
pub use log_repository::PgUpdateLogRepository;
pub use maintenance_repository::{PgCommunityStats, PgQualityMetricsRepository};
pub use version_repository::PgVersionRepository;

/// Backs every repository with tables reached through `pool`
pub fn postgres_store(pool: &DatabasePool) -> Store {
    Store {
        versions: Arc::new(PgVersionRepository::new(pool.clone())),
        archive: Arc::new(PgArchiveRepository::new(pool.clone())),
        logs: Arc::new(PgUpdateLogRepository::new(pool.clone())),
        configs: Arc::new(PgUpdateConfigRepository::new(pool.clone())),
        quality_metrics: Arc::new(PgQualityMetricsRepository::new(pool.clone())),
        community: Arc::new(PgCommunityStats::new(pool.clone())),
    }
}
