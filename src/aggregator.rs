//! Merges source payloads into one dataset per data type

use chrono::{Duration, Utc};
use futures::future::join_all;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::constants::aggregation::{
    ACTIVE_PREDICTOR_WINDOW_DAYS, FALLBACK_ACCURACY_RATE, HIGH_RELIABILITY_MIN_SOURCES,
};
use crate::error::StoreError;
use crate::metrics::pipeline_metrics::PipelineMetrics;
use crate::models::{
    CommunityData, DataPayload, DataType, Insight, InsightsData, MarketData, MarketRegion,
    ProductsData, Reliability, SourceRecords, TrendsData,
};
use crate::sources::{DataSource, SourceFetchError, SourcePayload, SourceSet};
use crate::store::CommunityStats;

#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("All {attempted} {data_type} sources failed: {}", summarize(.failures))]
    AllSourcesFailed {
        data_type: DataType,
        attempted: usize,
        failures: Vec<(String, SourceFetchError)>,
    },

    #[error("Community statistics unavailable: {0}")]
    Community(#[from] StoreError),
}

fn summarize(failures: &[(String, SourceFetchError)]) -> String {
    failures
        .iter()
        .map(|(name, err)| format!("{name}: {err}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Outcome of fetching every source of one fan-out type
#[derive(Debug)]
pub struct FanOut {
    pub succeeded: Vec<SourcePayload>,
    pub failed: Vec<(String, SourceFetchError)>,
}

/// Fetches all sources concurrently and waits for every one to settle
pub async fn fan_out(sources: &[Arc<dyn DataSource>]) -> FanOut {
    let results = join_all(sources.iter().map(|source| async move {
        (source.name().to_string(), source.fetch().await)
    }))
    .await;

    let mut succeeded = Vec::new();
    let mut failed = Vec::new();
    for (name, result) in results {
        match result {
            Ok(payload) => succeeded.push(payload),
            Err(e) => {
                warn!("Source '{}' failed, excluding it from aggregation: {}", name, e);
                PipelineMetrics::record_source_failure(&name);
                failed.push((name, e));
            }
        }
    }

    FanOut { succeeded, failed }
}

/// Formats the mean accuracy with one decimal, or the fallback when empty
pub fn accuracy_rate(accuracies: &[f64]) -> String {
    if accuracies.is_empty() {
        return FALLBACK_ACCURACY_RATE.to_string();
    }
    let mean = accuracies.iter().sum::<f64>() / accuracies.len() as f64;
    format!("{mean:.1}")
}

pub struct Aggregator {
    sources: SourceSet,
    community: Arc<dyn CommunityStats>,
}

impl Aggregator {
    pub fn new(sources: SourceSet, community: Arc<dyn CommunityStats>) -> Self {
        Self { sources, community }
    }

    pub async fn aggregate(&self, data_type: DataType) -> Result<DataPayload, AggregationError> {
        debug!("Aggregating {} data", data_type);
        let payload = match data_type {
            DataType::Trends => DataPayload::Trends(self.aggregate_trends().await?),
            DataType::Products => DataPayload::Products(self.aggregate_products().await?),
            DataType::Market => DataPayload::Market(market_snapshot()),
            DataType::Community => DataPayload::Community(self.community_stats().await?),
            DataType::Insights => DataPayload::Insights(insights_snapshot()),
        };
        Ok(payload)
    }

    async fn settle(
        &self,
        data_type: DataType,
        sources: &[Arc<dyn DataSource>],
    ) -> Result<Vec<SourcePayload>, AggregationError> {
        let FanOut { succeeded, failed } = fan_out(sources).await;

        if succeeded.is_empty() {
            return Err(AggregationError::AllSourcesFailed {
                data_type,
                attempted: sources.len(),
                failures: failed,
            });
        }

        info!(
            "{} sources settled: {} succeeded, {} failed",
            data_type,
            succeeded.len(),
            failed.len()
        );
        Ok(succeeded)
    }

    async fn aggregate_trends(&self) -> Result<TrendsData, AggregationError> {
        let payloads = self.settle(DataType::Trends, &self.sources.trends).await?;

        let mut data = TrendsData {
            aggregated_at: Utc::now(),
            sources: payloads.len(),
            trends: Vec::new(),
            articles: Vec::new(),
            sales: Vec::new(),
            reliability: if payloads.len() >= HIGH_RELIABILITY_MIN_SOURCES {
                Reliability::High
            } else {
                Reliability::Medium
            },
        };

        for payload in payloads {
            match payload.records {
                SourceRecords::Trends(trends) => data.trends.extend(trends),
                SourceRecords::Articles(articles) => data.articles.extend(articles),
                SourceRecords::Sales(sales) => data.sales.extend(sales),
                other => debug!(
                    "Ignoring {} records from '{}' in trends aggregation",
                    other.kind(),
                    payload.source
                ),
            }
        }

        Ok(data)
    }

    async fn aggregate_products(&self) -> Result<ProductsData, AggregationError> {
        let payloads = self.settle(DataType::Products, &self.sources.products).await?;

        let mut data = ProductsData {
            aggregated_at: Utc::now(),
            sources: payloads.len(),
            products: Vec::new(),
            pricing: Vec::new(),
            reviews: Vec::new(),
        };

        for payload in payloads {
            match payload.records {
                SourceRecords::Products(products) => data.products.extend(products),
                SourceRecords::Pricing(pricing) => data.pricing.extend(pricing),
                SourceRecords::Reviews(reviews) => data.reviews.extend(reviews),
                other => debug!(
                    "Ignoring {} records from '{}' in products aggregation",
                    other.kind(),
                    payload.source
                ),
            }
        }

        Ok(data)
    }

    async fn community_stats(&self) -> Result<CommunityData, AggregationError> {
        let now = Utc::now();
        let activity = self
            .community
            .member_activity(now - Duration::days(ACTIVE_PREDICTOR_WINDOW_DAYS))
            .await?;
        let accuracies = self.community.prediction_accuracies().await?;

        Ok(CommunityData {
            total_members: activity.total_members,
            active_predictors: activity.active_predictors,
            accuracy_rate: format!("{}%", accuracy_rate(&accuracies)),
            last_updated: now,
        })
    }
}

fn market_snapshot() -> MarketData {
    let region = |name: &str, share: &str, growth: &str| MarketRegion {
        name: name.to_string(),
        share: share.to_string(),
        growth: growth.to_string(),
    };

    MarketData {
        market_size: "$18.3B".to_string(),
        growth: "+8.1%".to_string(),
        regions: vec![
            region("South Korea", "45%", "+8.1%"),
            region("China", "28%", "+12.3%"),
            region("Japan", "15%", "+4.2%"),
        ],
        last_updated: Utc::now(),
    }
}

fn insights_snapshot() -> InsightsData {
    let insight = |id, title: &str, description: &str, impact: &str, category: &str, date: &str, source: &str| Insight {
        id,
        title: title.to_string(),
        description: description.to_string(),
        impact: impact.to_string(),
        category: category.to_string(),
        date: date.to_string(),
        source: source.to_string(),
    };

    InsightsData {
        insights: vec![
            insight(
                1,
                "AI Skin Analysis Accuracy Reaches 94%",
                "Latest AI models can now detect 14 different skin concerns with 94% accuracy, matching dermatologist assessments.",
                "High",
                "Technology",
                "2024-01-20",
                "Beauty Tech Research Institute",
            ),
            insight(
                2,
                "Virtual Try-On Reduces Returns by 67%",
                "Brands using AR virtual try-on technology report significant reduction in product returns and increased customer satisfaction.",
                "High",
                "E-commerce",
                "2024-01-18",
                "Digital Beauty Analytics",
            ),
            insight(
                3,
                "Personalized Skincare Shows 45% Better Results",
                "AI-powered personalized skincare routines demonstrate significantly better outcomes compared to generic recommendations.",
                "Medium",
                "Personalization",
                "2024-01-15",
                "Skincare Efficacy Study",
            ),
        ],
        last_updated: Utc::now(),
    }
}
