//! Mock implementations for testing

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::sources::{DataSource, SourceFetchError, SourcePayload};

/// Source that always fails with `Unavailable` and counts its calls
#[derive(Debug)]
pub struct FailingSource {
    name: String,
    calls: AtomicUsize,
}

impl FailingSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSource for FailingSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<SourcePayload, SourceFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(SourceFetchError::Unavailable(format!(
            "{} is down for testing",
            self.name
        )))
    }
}
