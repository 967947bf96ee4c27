//! HTTP surface: cron triggers, status views, version reads and metrics

pub mod auth;
pub mod cron;
pub mod data;
pub mod error;


use anyhow::{Context, Result};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use secrecy::SecretString;
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::app::AppContext;
use crate::metrics;

pub use error::ApiError;

/// Shared handler state
#[derive(Clone)]
pub struct ApiState {
    pub app: AppContext,
    pub cron_secret: Option<Arc<SecretString>>,
}

impl ApiState {
    pub fn new(app: AppContext, cron_secret: Option<SecretString>) -> Self {
        Self {
            app,
            cron_secret: cron_secret.map(Arc::new),
        }
    }

    /// Reads the trigger secret from `CRON_SECRET`
    pub fn from_env(app: AppContext) -> Self {
        let secret = env::var("CRON_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .map(SecretString::from);
        if secret.is_none() {
            warn!("CRON_SECRET not set; cron trigger endpoints will reject every request");
        }
        Self::new(app, secret)
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route(
            "/cron/update-data",
            get(cron::update_status).post(cron::trigger_update),
        )
        .route(
            "/cron/archive-cleanup",
            get(cron::cleanup_status).post(cron::trigger_cleanup),
        )
        .route("/data/:data_type", get(data::active_version))
        .route("/data/:data_type/history", get(data::version_history))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn metrics_handler() -> Result<impl IntoResponse, ApiError> {
    let body = metrics::render()
        .map_err(|e| ApiError::Internal(format!("Failed to encode metrics: {}", e)))?;
    Ok(([(CONTENT_TYPE, metrics::exporter::CONTENT_TYPE)], body))
}

/// Binds `addr` and serves until the process is stopped
pub async fn serve(state: ApiState, addr: SocketAddr) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router(state))
        .await
        .context("HTTP server error")?;

    Ok(())
}
