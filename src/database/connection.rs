use anyhow::{Context, Result};
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use std::env;
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;

pub type DatabasePool = Pool<Postgres>;

/// Privileged and read-only pools
///
/// Every write goes through `write`. The read endpoints use `read`, which
/// shares the write pool when no restricted credential is configured.
#[derive(Debug, Clone)]
pub struct DatabasePools {
    pub write: DatabasePool,
    pub read: DatabasePool,
}

/// Connection strings for both credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseUrls {
    pub write: String,
    pub read: Option<String>,
}

impl DatabaseUrls {
    /// Reads `DATABASE_URL` and the optional `DATABASE_READ_URL`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let write = lookup("DATABASE_URL")
            .filter(|url| !url.is_empty())
            .context("DATABASE_URL environment variable not set")?;
        let read = lookup("DATABASE_READ_URL").filter(|url| !url.is_empty());
        Ok(Self { write, read })
    }
}

/// Hides the password of a connection string for logging
pub fn mask_database_url(database_url: &str) -> String {
    match url::Url::parse(database_url) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("***"));
            }
            parsed.to_string()
        }
        Err(_) => "<unparseable database url>".to_string(),
    }
}

async fn connect_pool(database_url: &str, config: &DatabaseConfig) -> Result<DatabasePool> {
    info!(
        "Connecting to PostgreSQL database at {}",
        mask_database_url(database_url)
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect(database_url)
        .await
        .context("Failed to create PostgreSQL connection pool")?;

    Ok(pool)
}

/// Establishes both connection pools
pub async fn establish_connections(
    urls: &DatabaseUrls,
    config: &DatabaseConfig,
) -> Result<DatabasePools> {
    let write = connect_pool(&urls.write, config).await?;

    let read = match &urls.read {
        Some(read_url) => connect_pool(read_url, config)
            .await
            .context("Failed to connect with the read-only credential")?,
        None => {
            info!("DATABASE_READ_URL not set, read endpoints share the privileged pool");
            write.clone()
        }
    };

    info!("Successfully connected to PostgreSQL database");

    Ok(DatabasePools { write, read })
}

/// Run pending migrations
pub async fn run_migrations(pool: &DatabasePool) -> Result<()> {
    info!("Running database migrations");

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;

    info!("Database migrations completed successfully");

    Ok(())
}
