use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::api::{self, ApiState};
use crate::app::AppContext;
use crate::config::{self, TrendvaultConfig};
use crate::models::DataType;
use crate::pipeline::UpdateTarget;
use crate::scheduler::DevScheduler;
use crate::setup;
use crate::store::MemoryStore;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Trendvault - versioned K-Beauty trend data with freshness reporting",
    long_about = "Trendvault aggregates K-Beauty trend, product, market, community and insight \
                  data into immutable versions, keeps one active version per data type, archives \
                  expired versions and reports how fresh each data type is."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Keep all tables in process memory instead of PostgreSQL
    #[arg(long, global = true)]
    pub in_memory: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the cron and read endpoints (default behavior)
    Serve,
    /// Seed update configs and commit an initial version of every data type
    Setup,
    /// Manually refresh one data type, or "all" of them in order
    Update {
        /// Data type name or "all"
        #[arg(value_name = "TYPE")]
        target: UpdateTarget,
    },
    /// Archive expired versions and prune old logs and metrics
    Cleanup,
    /// Print the freshness of every data type
    Status,
}

/// Explicit paths must exist; the default path falls back to built-in defaults
pub fn load_configuration(path: Option<&PathBuf>) -> Result<TrendvaultConfig> {
    let config = match path {
        Some(path) => {
            info!("Using configuration file: {:?}", path);
            config::load_config(path)?
        }
        None => {
            let path = config::default_config_path()?;
            info!("Using configuration file: {:?}", path);
            config::load_or_default(&path)?
        }
    };
    info!("Configuration loaded successfully");
    Ok(config)
}

async fn build_context(config: TrendvaultConfig, in_memory: bool) -> Result<AppContext> {
    if in_memory {
        AppContext::in_memory(config, Arc::new(MemoryStore::new())).await
    } else {
        AppContext::connect(config).await
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = load_configuration(cli.config.as_ref())?;
    let app = build_context(config, cli.in_memory).await?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(app).await,
        Commands::Setup => run_setup(&app).await,
        Commands::Update { target } => run_update(&app, target).await,
        Commands::Cleanup => run_cleanup(&app).await,
        Commands::Status => print_status(&app).await,
    }
}

async fn serve(app: AppContext) -> Result<()> {
    let addr: SocketAddr = app
        .config
        .server
        .bind_address
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", app.config.server.bind_address))?;

    let mut scheduler = DevScheduler::new(
        app.config.scheduler.clone(),
        app.pipeline.clone(),
        app.archiver.clone(),
    )
    .await?;
    scheduler.start().await?;

    let result = api::serve(ApiState::from_env(app), addr).await;

    scheduler.stop().await?;
    result
}

async fn run_setup(app: &AppContext) -> Result<()> {
    println!("Setting up K-Beauty data versioning...");
    let summary = setup::run_setup(app).await?;

    println!("Seeded {} update config(s)", summary.configs_seeded);
    for version in &summary.versions {
        println!(
            "✓ {} initialized as {} ({})",
            version.data_type(),
            version.version,
            version.id
        );
    }
    println!("\nSetup completed in {}ms", summary.execution_time_ms);

    Ok(())
}

async fn run_update(app: &AppContext, target: UpdateTarget) -> Result<()> {
    let targets: Vec<DataType> = match target {
        UpdateTarget::All => DataType::ALL.to_vec(),
        UpdateTarget::Single(data_type) => vec![data_type],
    };

    let started = Instant::now();
    let mut failed = Vec::new();
    for data_type in targets {
        println!("Updating {}...", data_type);
        let outcome = app.pipeline.run_single(data_type).await;
        if outcome.succeeded() {
            println!(
                "✓ {} updated to {} in {}ms",
                data_type,
                outcome.version.as_deref().unwrap_or("-"),
                outcome.execution_time_ms
            );
        } else {
            println!(
                "✗ {} failed: {}",
                data_type,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
            failed.push(data_type);
        }
    }

    println!("\nTotal time: {}ms", started.elapsed().as_millis());

    if !failed.is_empty() {
        let names: Vec<&str> = failed.iter().map(|t| t.as_str()).collect();
        bail!("Update failed for: {}", names.join(", "));
    }
    Ok(())
}

async fn run_cleanup(app: &AppContext) -> Result<()> {
    println!("Running archive cleanup...");
    let summary = app.archiver.run_cleanup().await;

    for operation in &summary.operations {
        match &operation.error {
            None => println!("✓ {}: {} record(s)", operation.operation, operation.records),
            Some(e) => println!("✗ {}: {}", operation.operation, e),
        }
    }
    println!(
        "\nCleanup {} in {}ms ({} record(s))",
        summary.status.as_str(),
        summary.execution_time_ms,
        summary.total_records
    );

    Ok(())
}

async fn print_status(app: &AppContext) -> Result<()> {
    let table = app.freshness.table().await?;

    println!(
        "{:<10} {:<8} {:<14} {:<26} {:<26}",
        "TYPE", "STATUS", "VERSION", "LAST UPDATE", "NEXT UPDATE"
    );
    for row in table {
        println!(
            "{:<10} {:<8} {:<14} {:<26} {:<26}",
            row.data_type.as_str(),
            row.status.as_str(),
            row.version.as_deref().unwrap_or("-"),
            row.last_update
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "-".to_string()),
            row.next_update
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "-".to_string()),
        );
    }

    Ok(())
}
