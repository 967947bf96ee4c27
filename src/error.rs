use thiserror::Error;

use crate::aggregator::AggregationError;

/// A read or write rejected by the backing store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to decode {entity} row: {message}")]
    Decode {
        entity: &'static str,
        message: String,
    },

    #[error("Failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn decode(entity: &'static str, message: impl std::fmt::Display) -> Self {
        Self::Decode {
            entity,
            message: message.to_string(),
        }
    }
}

/// Failure of a single update run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Aggregation failed: {0}")]
    Aggregation(#[from] AggregationError),

    #[error("Persistence failed: {0}")]
    Persistence(#[from] StoreError),
}

impl PipelineError {
    /// Pipeline stage recorded in the structured log detail
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Aggregation(_) => "aggregate",
            PipelineError::Persistence(_) => "commit",
        }
    }
}
