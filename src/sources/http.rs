use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

use super::{DataSource, SourceFetchError, SourcePayload};
use crate::constants::network::HTTP_REQUEST_TIMEOUT_SECS;
use crate::models::SourceRecords;

/// Fetches a `{"kind": ..., "items": [...]}` document from a URL
pub struct HttpSource {
    name: String,
    url: String,
    client: Client,
}

impl HttpSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        // Builder only fails when the TLS backend cannot initialise; fall back
        // to the default client, which carries no request timeout.
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            name: name.into(),
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl DataSource for HttpSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<SourcePayload, SourceFetchError> {
        debug!("Fetching source '{}' from: {}", self.name, self.url);

        let response = match self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                error!("Network error fetching '{}' from {}: {}", self.name, self.url, e);
                return Err(SourceFetchError::NetworkError(e.to_string()));
            }
        };

        let status = response.status();

        if !status.is_success() {
            error!(
                "Source '{}' returned HTTP {}: {}",
                self.name,
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            );
            return Err(SourceFetchError::HttpError(status.as_u16()));
        }

        let records: SourceRecords = match response.json().await {
            Ok(records) => records,
            Err(e) => {
                error!("JSON parsing error for source '{}': {}", self.name, e);
                return Err(SourceFetchError::JsonError(e.to_string()));
            }
        };

        debug!("Successfully fetched source '{}'", self.name);
        Ok(SourcePayload {
            source: self.name.clone(),
            fetched_at: Utc::now(),
            records,
        })
    }
}
