//! Typed payloads stored in `data_versions.data`
//!
//! Each data type has its own shape. [`DataPayload`] is the tagged union the
//! aggregator produces and the version store persists; the JSON column only
//! holds the inner structure, the tag lives in the `data_type` column.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::data_type::DataType;

/// Records returned by a single upstream source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum SourceRecords {
    Trends(Vec<TrendSignal>),
    Articles(Vec<NewsArticle>),
    Sales(Vec<SalesCategory>),
    Products(Vec<ProductListing>),
    Pricing(Vec<ProductPricing>),
    Reviews(Vec<ReviewSummary>),
}

impl SourceRecords {
    pub fn kind(&self) -> &'static str {
        match self {
            SourceRecords::Trends(_) => "trends",
            SourceRecords::Articles(_) => "articles",
            SourceRecords::Sales(_) => "sales",
            SourceRecords::Products(_) => "products",
            SourceRecords::Pricing(_) => "pricing",
            SourceRecords::Reviews(_) => "reviews",
        }
    }
}

/// A single trend observation; search keywords and social hashtags differ in shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TrendSignal {
    Keyword {
        keyword: String,
        interest: u32,
        growth: String,
        region: String,
    },
    Hashtag {
        hashtag: String,
        mentions: u64,
        growth: String,
        platforms: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub title: String,
    pub sentiment: String,
    pub mentions: u32,
    pub published_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesCategory {
    pub category: String,
    pub growth: String,
    pub top_brands: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    pub id: String,
    pub name: String,
    pub price: String,
    pub rating: f64,
    pub reviews: u64,
    pub in_stock: bool,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPricing {
    pub product_id: String,
    pub retailers: Vec<RetailerOffer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetailerOffer {
    pub name: String,
    pub price: String,
    pub in_stock: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub product_id: String,
    pub average_rating: f64,
    pub review_count: u64,
    pub sentiment: String,
    pub last_scraped: DateTime<Utc>,
}

/// How many independent sources backed an aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reliability {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendsData {
    pub aggregated_at: DateTime<Utc>,
    /// Number of sources that answered successfully
    pub sources: usize,
    pub trends: Vec<TrendSignal>,
    #[serde(default)]
    pub articles: Vec<NewsArticle>,
    #[serde(default)]
    pub sales: Vec<SalesCategory>,
    pub reliability: Reliability,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductsData {
    pub aggregated_at: DateTime<Utc>,
    pub sources: usize,
    pub products: Vec<ProductListing>,
    pub pricing: Vec<ProductPricing>,
    pub reviews: Vec<ReviewSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketRegion {
    pub name: String,
    pub share: String,
    pub growth: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    pub market_size: String,
    pub growth: String,
    pub regions: Vec<MarketRegion>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityData {
    pub total_members: i64,
    pub active_predictors: i64,
    /// Mean prediction accuracy with one decimal, e.g. `"89.3%"`
    pub accuracy_rate: String,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub impact: String,
    pub category: String,
    pub date: String,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsData {
    pub insights: Vec<Insight>,
    pub last_updated: DateTime<Utc>,
}

/// Aggregated content of one data version, keyed by data type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dataType", content = "data", rename_all = "lowercase")]
pub enum DataPayload {
    Trends(TrendsData),
    Products(ProductsData),
    Market(MarketData),
    Community(CommunityData),
    Insights(InsightsData),
}

impl DataPayload {
    pub fn data_type(&self) -> DataType {
        match self {
            DataPayload::Trends(_) => DataType::Trends,
            DataPayload::Products(_) => DataType::Products,
            DataPayload::Market(_) => DataType::Market,
            DataPayload::Community(_) => DataType::Community,
            DataPayload::Insights(_) => DataType::Insights,
        }
    }

    /// Serializes only the inner structure for the `data` column
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        match self {
            DataPayload::Trends(data) => serde_json::to_value(data),
            DataPayload::Products(data) => serde_json::to_value(data),
            DataPayload::Market(data) => serde_json::to_value(data),
            DataPayload::Community(data) => serde_json::to_value(data),
            DataPayload::Insights(data) => serde_json::to_value(data),
        }
    }

    /// Rebuilds a payload from the `data_type` and `data` columns
    pub fn from_json(data_type: DataType, value: Value) -> Result<Self, serde_json::Error> {
        match data_type {
            DataType::Trends => serde_json::from_value(value).map(DataPayload::Trends),
            DataType::Products => serde_json::from_value(value).map(DataPayload::Products),
            DataType::Market => serde_json::from_value(value).map(DataPayload::Market),
            DataType::Community => serde_json::from_value(value).map(DataPayload::Community),
            DataType::Insights => serde_json::from_value(value).map(DataPayload::Insights),
        }
    }
}
