//! Upstream data sources
//!
//! The aggregator only sees the [`DataSource`] capability. The literal stubs
//! stand in for real integrations; [`HttpSource`] fetches the same record
//! shape from a configured URL.

pub mod http;
pub mod stubs;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::config::models::SourcesConfig;
use crate::models::SourceRecords;

pub use http::HttpSource;
pub use stubs::StubSource;

/// A single source failed to answer
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SourceFetchError {
    #[error("HTTP error with status code: {0}")]
    HttpError(u16),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("JSON parsing error: {0}")]
    JsonError(String),

    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

/// Records fetched from one named source
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePayload {
    pub source: String,
    pub fetched_at: DateTime<Utc>,
    pub records: SourceRecords,
}

#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self) -> Result<SourcePayload, SourceFetchError>;
}

/// The fan-out source lists used by the aggregator
#[derive(Clone, Default)]
pub struct SourceSet {
    pub trends: Vec<Arc<dyn DataSource>>,
    pub products: Vec<Arc<dyn DataSource>>,
}

impl SourceSet {
    /// Literal stubs for every source, with the given simulated latency
    pub fn stubs(latency: Duration) -> Self {
        Self {
            trends: stubs::trend_sources(latency),
            products: stubs::product_sources(latency),
        }
    }

    /// Builds the source lists from configuration, replacing a stub with an
    /// HTTP source wherever a URL override names it
    pub fn from_config(config: &SourcesConfig) -> Self {
        let latency = Duration::from_millis(config.stub_latency_ms);
        let replace = |sources: Vec<Arc<dyn DataSource>>| -> Vec<Arc<dyn DataSource>> {
            sources
                .into_iter()
                .map(|source| match config.http_overrides.get(source.name()) {
                    Some(url) => {
                        info!("Using HTTP source for '{}': {}", source.name(), url);
                        Arc::new(HttpSource::new(source.name(), url)) as Arc<dyn DataSource>
                    }
                    None => source,
                })
                .collect()
        };

        Self {
            trends: replace(stubs::trend_sources(latency)),
            products: replace(stubs::product_sources(latency)),
        }
    }
}
