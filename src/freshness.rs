//! Freshness classification of the active version per data type

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::StoreError;
use crate::models::{DataType, DataVersion};
use crate::store::Store;

/// Ordered from most to least current; `NoData` ranks after `Stale`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessStatus {
    Fresh,
    Aging,
    Stale,
    NoData,
}

impl FreshnessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FreshnessStatus::Fresh => "fresh",
            FreshnessStatus::Aging => "aging",
            FreshnessStatus::Stale => "stale",
            FreshnessStatus::NoData => "no_data",
        }
    }
}

impl std::fmt::Display for FreshnessStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshnessReport {
    pub data_type: DataType,
    pub status: FreshnessStatus,
    pub last_update: Option<DateTime<Utc>>,
    pub next_update: Option<DateTime<Utc>>,
    pub version: Option<String>,
}

/// Classifies an age against the update interval.
///
/// fresh below one interval, aging below two, stale from two intervals on.
/// A creation time in the future counts as fresh.
pub fn classify(last_update: DateTime<Utc>, interval: Duration, now: DateTime<Utc>) -> FreshnessStatus {
    let age = now - last_update;
    if age < interval {
        FreshnessStatus::Fresh
    } else if age < interval * 2 {
        FreshnessStatus::Aging
    } else {
        FreshnessStatus::Stale
    }
}

/// Builds the report for one data type from its active version, if any
pub fn report(
    data_type: DataType,
    active: Option<&DataVersion>,
    interval: Duration,
    now: DateTime<Utc>,
) -> FreshnessReport {
    match active {
        Some(version) => FreshnessReport {
            data_type,
            status: classify(version.created_at, interval, now),
            last_update: Some(version.created_at),
            next_update: Some(version.created_at + interval),
            version: Some(version.version.clone()),
        },
        None => FreshnessReport {
            data_type,
            status: FreshnessStatus::NoData,
            last_update: None,
            next_update: None,
            version: None,
        },
    }
}

/// Reads active versions and configured intervals to report freshness
#[derive(Clone)]
pub struct FreshnessReporter {
    store: Store,
}

impl FreshnessReporter {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    async fn interval_for(&self, data_type: DataType) -> Result<Duration, StoreError> {
        Ok(match self.store.configs.get(data_type).await? {
            Some(config) => config.interval(),
            None => Duration::minutes(i64::from(data_type.default_interval_minutes())),
        })
    }

    pub async fn status(&self, data_type: DataType) -> Result<FreshnessReport, StoreError> {
        let interval = self.interval_for(data_type).await?;
        let active = self.store.versions.active_version(data_type).await?;
        Ok(report(data_type, active.as_ref(), interval, Utc::now()))
    }

    /// One report per data type, in declaration order
    pub async fn table(&self) -> Result<Vec<FreshnessReport>, StoreError> {
        let mut reports = Vec::with_capacity(DataType::ALL.len());
        for data_type in DataType::ALL {
            reports.push(self.status(data_type).await?);
        }
        Ok(reports)
    }
}
