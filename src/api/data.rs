//! Read-only access to stored versions

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::error::ApiError;
use super::ApiState;
use crate::constants::api::{DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};
use crate::models::{DataType, DataVersion};

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<i64>,
}

fn parse_data_type(raw: &str) -> Result<DataType, ApiError> {
    raw.parse()
        .map_err(|e: crate::models::UnknownDataType| ApiError::BadRequest(e.to_string()))
}

pub async fn active_version(
    State(state): State<ApiState>,
    Path(data_type): Path<String>,
) -> Result<Json<DataVersion>, ApiError> {
    let data_type = parse_data_type(&data_type)?;

    state
        .app
        .read_store
        .versions
        .active_version(data_type)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("No active {} version", data_type)))
}

pub async fn version_history(
    State(state): State<ApiState>,
    Path(data_type): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<DataVersion>>, ApiError> {
    let data_type = parse_data_type(&data_type)?;
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);

    let versions = state
        .app
        .read_store
        .versions
        .history(data_type, limit)
        .await?;

    Ok(Json(versions))
}
