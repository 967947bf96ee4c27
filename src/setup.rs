//! One-time initialisation of policies and initial versions

use anyhow::{Context, Result};
use std::time::Instant;
use tracing::info;

use crate::app::AppContext;
use crate::models::{DataType, DataVersion, NewUpdateLog, RunStatus, SYSTEM_SETUP_SCOPE};

/// Source recorded on versions committed by setup
pub const SETUP_SOURCE: &str = "manual-setup";

#[derive(Debug, Clone)]
pub struct SetupSummary {
    pub configs_seeded: usize,
    pub versions: Vec<DataVersion>,
    pub execution_time_ms: i64,
}

/// Seeds `update_configs`, then commits one initial version per data type.
///
/// Stops at the first failure; types committed before it stay committed.
pub async fn run_setup(app: &AppContext) -> Result<SetupSummary> {
    let started = Instant::now();
    info!("Setting up data versioning tables");

    let configs = app.config.resolved_update_configs();
    for config in &configs {
        app.store
            .configs
            .upsert(config)
            .await
            .with_context(|| format!("Failed to seed update config for {}", config.data_type))?;
        info!(
            "Seeded {} config: every {} minute(s), enabled={}",
            config.data_type, config.update_interval_minutes, config.is_enabled
        );
    }

    let versions = app.pipeline.versions();
    let mut committed = Vec::with_capacity(DataType::ALL.len());
    for data_type in DataType::ALL {
        let payload = app
            .aggregator
            .aggregate(data_type)
            .await
            .with_context(|| format!("Failed to build initial {} data", data_type))?;
        let version = versions
            .commit(payload, SETUP_SOURCE)
            .await
            .with_context(|| format!("Failed to store initial {} version", data_type))?;
        info!("Initialized {} data as {}", data_type, version.version);
        committed.push(version);
    }

    let execution_time_ms = started.elapsed().as_millis() as i64;
    app.store
        .logs
        .append(
            NewUpdateLog::new(
                SYSTEM_SETUP_SCOPE,
                RunStatus::Success,
                "Initial data system setup completed successfully",
            )
            .with_execution_time(execution_time_ms)
            .with_records(committed.len() as i64),
        )
        .await
        .context("Failed to record setup log")?;

    info!(
        "Setup completed: {} config(s), {} version(s) in {}ms",
        configs.len(),
        committed.len(),
        execution_time_ms
    );

    Ok(SetupSummary {
        configs_seeded: configs.len(),
        versions: committed,
        execution_time_ms,
    })
}
