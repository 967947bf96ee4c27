//! Wiring of stores, sources and services shared by every command

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::aggregator::Aggregator;
use crate::archiver::Archiver;
use crate::config::TrendvaultConfig;
use crate::database::{self, DatabaseUrls};
use crate::freshness::FreshnessReporter;
use crate::pipeline::UpdatePipeline;
use crate::sources::SourceSet;
use crate::store::{MemoryStore, Store};

/// Services built once at startup
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<TrendvaultConfig>,
    /// Privileged store; every write goes here
    pub store: Store,
    /// Store reached with the restricted read credential
    pub read_store: Store,
    pub aggregator: Arc<Aggregator>,
    pub pipeline: UpdatePipeline,
    pub archiver: Archiver,
    pub freshness: FreshnessReporter,
    /// Freshness over `read_store`, for the unauthenticated status views
    pub read_freshness: FreshnessReporter,
}

impl AppContext {
    pub fn new(config: TrendvaultConfig, store: Store, read_store: Store, sources: SourceSet) -> Self {
        let aggregator = Arc::new(Aggregator::new(sources, store.community.clone()));
        let archiver = Archiver::new(store.clone(), config.retention.clone());
        let pipeline = UpdatePipeline::new(store.clone(), aggregator.clone(), archiver.clone());
        let freshness = FreshnessReporter::new(store.clone());
        let read_freshness = FreshnessReporter::new(read_store.clone());

        Self {
            config: Arc::new(config),
            store,
            read_store,
            aggregator,
            pipeline,
            archiver,
            freshness,
            read_freshness,
        }
    }

    /// Connects both pools and applies pending migrations
    pub async fn connect(config: TrendvaultConfig) -> Result<Self> {
        let urls = DatabaseUrls::from_env()?;
        let pools = database::establish_connections(&urls, &config.database).await?;
        database::run_migrations(&pools.write)
            .await
            .context("Failed to prepare database schema")?;

        let store = database::postgres_store(&pools.write);
        let read_store = database::postgres_store(&pools.read);
        let sources = SourceSet::from_config(&config.sources);

        Ok(Self::new(config, store, read_store, sources))
    }

    /// Runs against process-local tables, seeded with the configured policies
    pub async fn in_memory(config: TrendvaultConfig, memory: Arc<MemoryStore>) -> Result<Self> {
        info!("Using in-memory storage; data is lost on exit");
        let store = Store::memory(memory);
        for update_config in config.resolved_update_configs() {
            store
                .configs
                .upsert(&update_config)
                .await
                .with_context(|| format!("Failed to seed {} config", update_config.data_type))?;
        }

        let sources = SourceSet::from_config(&config.sources);
        Ok(Self::new(config, store.clone(), store, sources))
    }
}
