//! Optional in-process cron for development setups
//!
//! Production deployments call the `/cron/*` endpoints from an external
//! scheduler. With `scheduler.enabled` the server also runs the batch update
//! and the cleanup itself.

use anyhow::{Context, Result};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info};

use crate::archiver::Archiver;
use crate::config::SchedulerConfig;
use crate::pipeline::UpdatePipeline;

/// Owns the cron jobs for batch updates and cleanup
pub struct DevScheduler {
    config: SchedulerConfig,
    pipeline: UpdatePipeline,
    archiver: Archiver,
    scheduler: JobScheduler,
}

impl DevScheduler {
    pub async fn new(
        config: SchedulerConfig,
        pipeline: UpdatePipeline,
        archiver: Archiver,
    ) -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .context("Failed to create job scheduler")?;

        Ok(Self {
            config,
            pipeline,
            archiver,
            scheduler,
        })
    }

    /// Registers both jobs and starts ticking; a no-op when disabled
    pub async fn start(&mut self) -> Result<()> {
        if !self.config.enabled {
            info!("In-process scheduler is disabled in configuration");
            return Ok(());
        }

        info!(
            "Starting in-process scheduler (updates: {}, cleanup: {})",
            self.config.update_schedule, self.config.cleanup_schedule
        );

        let pipeline = self.pipeline.clone();
        let update_job = Job::new_async(self.config.update_schedule.as_str(), move |_uuid, _l| {
            let pipeline = pipeline.clone();
            Box::pin(async move {
                info!("Running scheduled batch update");
                match pipeline.run_batch(false).await {
                    Ok(summary) => info!(
                        "Scheduled batch update {}: {} updated, {} failed",
                        summary.status.as_str(),
                        summary.total_updated,
                        summary.total_failed
                    ),
                    Err(e) => error!("Scheduled batch update failed: {}", e),
                }
            })
        })
        .context("Failed to create update job")?;

        let archiver = self.archiver.clone();
        let cleanup_job = Job::new_async(self.config.cleanup_schedule.as_str(), move |_uuid, _l| {
            let archiver = archiver.clone();
            Box::pin(async move {
                info!("Running scheduled archive cleanup");
                let summary = archiver.run_cleanup().await;
                info!(
                    "Scheduled archive cleanup {}: {} record(s)",
                    summary.status.as_str(),
                    summary.total_records
                );
            })
        })
        .context("Failed to create cleanup job")?;

        self.scheduler
            .add(update_job)
            .await
            .context("Failed to add update job to scheduler")?;
        self.scheduler
            .add(cleanup_job)
            .await
            .context("Failed to add cleanup job to scheduler")?;

        self.scheduler
            .start()
            .await
            .context("Failed to start scheduler")?;

        info!("In-process scheduler started successfully");
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        info!("Stopping in-process scheduler");
        self.scheduler
            .shutdown()
            .await
            .context("Failed to shutdown scheduler")?;
        Ok(())
    }
}
