use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::constants::intervals;

/// One of the independently versioned and scheduled data categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Trends,
    Products,
    Market,
    Community,
    Insights,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown data type: {0}")]
pub struct UnknownDataType(pub String);

impl DataType {
    /// Every data type, in the order batch setup and manual "all" runs use
    pub const ALL: [DataType; 5] = [
        DataType::Trends,
        DataType::Products,
        DataType::Market,
        DataType::Community,
        DataType::Insights,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Trends => "trends",
            DataType::Products => "products",
            DataType::Market => "market",
            DataType::Community => "community",
            DataType::Insights => "insights",
        }
    }

    /// Source label recorded on versions produced by the aggregator
    pub fn commit_source(&self) -> &'static str {
        match self {
            DataType::Trends => "multiple-apis",
            DataType::Products => "product-apis",
            DataType::Market => "market-research",
            DataType::Community => "internal-db",
            DataType::Insights => "ai-research",
        }
    }

    /// Upstream label used when seeding the update configuration
    pub fn default_config_source(&self) -> &'static str {
        match self {
            DataType::Trends => "k-beauty-api",
            DataType::Products => "product-api",
            DataType::Market => "market-research-api",
            DataType::Community => "internal-analytics",
            DataType::Insights => "ai-research-api",
        }
    }

    pub fn default_interval_minutes(&self) -> i32 {
        match self {
            DataType::Trends => intervals::TRENDS_MINUTES,
            DataType::Products => intervals::PRODUCTS_MINUTES,
            DataType::Market => intervals::MARKET_MINUTES,
            DataType::Community => intervals::COMMUNITY_MINUTES,
            DataType::Insights => intervals::INSIGHTS_MINUTES,
        }
    }

    pub fn default_retry_attempts(&self) -> i32 {
        match self {
            DataType::Market | DataType::Insights => 2,
            _ => 3,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = UnknownDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trends" => Ok(DataType::Trends),
            "products" => Ok(DataType::Products),
            "market" => Ok(DataType::Market),
            "community" => Ok(DataType::Community),
            "insights" => Ok(DataType::Insights),
            other => Err(UnknownDataType(other.to_string())),
        }
    }
}
