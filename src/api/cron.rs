//! `/cron/*` trigger and status endpoints

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

use super::auth::authorize;
use super::error::ApiError;
use super::ApiState;
use crate::archiver::CleanupOperation;
use crate::constants::api::{RECENT_CLEANUP_LIMIT, RECENT_LOG_LIMIT};
use crate::freshness::FreshnessReport;
use crate::models::{DataType, RunStatus, UpdateLog, ARCHIVE_CLEANUP_SCOPE};
use crate::pipeline::{BatchSummary, UpdateTarget};

/// Body of `POST /cron/update-data`; an empty body is a non-forced batch
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub force: bool,
}

impl UpdateRequest {
    fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))
    }

    /// `None` for a batch run
    fn target(&self) -> Result<Option<DataType>, ApiError> {
        match self.data_type.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => match raw.parse::<UpdateTarget>() {
                Ok(UpdateTarget::All) => Ok(None),
                Ok(UpdateTarget::Single(data_type)) => Ok(Some(data_type)),
                Err(e) => Err(ApiError::BadRequest(e.to_string())),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub summary: BatchSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleUpdateResponse {
    pub message: String,
    pub data_type: DataType,
    pub version_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UpdateResponse {
    Batch(BatchResponse),
    Single(SingleUpdateResponse),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusResponse {
    pub freshness: Vec<FreshnessReport>,
    pub recent_logs: Vec<UpdateLog>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub message: &'static str,
    pub status: RunStatus,
    pub results: Vec<CleanupOperation>,
    pub total_records: u64,
    pub execution_time: i64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveStats {
    pub total_archived: i64,
    pub by_type: BTreeMap<String, i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupStatusResponse {
    pub recent_cleanups: Vec<UpdateLog>,
    pub archive_stats: ArchiveStats,
    pub timestamp: DateTime<Utc>,
}

pub async fn trigger_update(
    State(state): State<ApiState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UpdateResponse>, ApiError> {
    authorize(state.cron_secret.as_deref(), &headers)?;

    let request = UpdateRequest::from_body(&body)?;
    let pipeline = &state.app.pipeline;

    match request.target()? {
        None => {
            info!("Cron batch update requested (force={})", request.force);
            let summary = pipeline.run_batch(request.force).await?;
            Ok(Json(UpdateResponse::Batch(BatchResponse {
                message: "Batch update completed",
                summary,
            })))
        }
        Some(data_type) => {
            info!("Manual update requested for {}", data_type);
            let outcome = pipeline.run_single(data_type).await;
            if !outcome.succeeded() {
                return Err(ApiError::UpdateFailed(format!(
                    "Failed to update {} data",
                    data_type
                )));
            }
            Ok(Json(UpdateResponse::Single(SingleUpdateResponse {
                message: format!("Successfully updated {} data", data_type),
                data_type,
                version_id: outcome.version_id,
                timestamp: outcome.timestamp,
            })))
        }
    }
}

pub async fn update_status(
    State(state): State<ApiState>,
) -> Result<Json<UpdateStatusResponse>, ApiError> {
    let freshness = state.app.read_freshness.table().await?;
    let recent_logs = state
        .app
        .read_store
        .logs
        .recent(None, RECENT_LOG_LIMIT)
        .await?;

    Ok(Json(UpdateStatusResponse {
        freshness,
        recent_logs,
        timestamp: Utc::now(),
    }))
}

pub async fn trigger_cleanup(
    State(state): State<ApiState>,
    headers: HeaderMap,
) -> Result<Json<CleanupResponse>, ApiError> {
    authorize(state.cron_secret.as_deref(), &headers)?;

    info!("Cron archive cleanup requested");
    let summary = state.app.archiver.run_cleanup().await;

    Ok(Json(CleanupResponse {
        message: "Archive cleanup completed",
        status: summary.status,
        results: summary.operations,
        total_records: summary.total_records,
        execution_time: summary.execution_time_ms,
        timestamp: Utc::now(),
    }))
}

pub async fn cleanup_status(
    State(state): State<ApiState>,
) -> Result<Json<CleanupStatusResponse>, ApiError> {
    let store = &state.app.read_store;
    let recent_cleanups = store
        .logs
        .recent(Some(ARCHIVE_CLEANUP_SCOPE), RECENT_CLEANUP_LIMIT)
        .await?;
    let by_type = store.archive.count_by_type().await?;

    Ok(Json(CleanupStatusResponse {
        recent_cleanups,
        archive_stats: ArchiveStats {
            total_archived: by_type.values().sum(),
            by_type,
        },
        timestamp: Utc::now(),
    }))
}
