//! Test data factories for creating common test objects

use chrono::Utc;

use crate::models::{
    CommunityData, DataPayload, DataType, Insight, InsightsData, MarketData, MarketRegion,
    ProductsData, Reliability, TrendSignal, TrendsData,
};

/// Factory for creating DataPayload test objects
pub struct PayloadFactory;

impl PayloadFactory {
    /// Trends payload with `count` keyword signals
    pub fn trends(count: usize) -> DataPayload {
        let trends = (0..count)
            .map(|i| TrendSignal::Keyword {
                keyword: format!("keyword-{i}"),
                interest: 50 + i as u32,
                growth: "+10%".to_string(),
                region: "global".to_string(),
            })
            .collect();

        DataPayload::Trends(TrendsData {
            aggregated_at: Utc::now(),
            sources: 4,
            trends,
            articles: Vec::new(),
            sales: Vec::new(),
            reliability: Reliability::High,
        })
    }

    pub fn products() -> DataPayload {
        DataPayload::Products(ProductsData {
            aggregated_at: Utc::now(),
            sources: 3,
            products: Vec::new(),
            pricing: Vec::new(),
            reviews: Vec::new(),
        })
    }

    pub fn market() -> DataPayload {
        DataPayload::Market(MarketData {
            market_size: "$1.0B".to_string(),
            growth: "+1.0%".to_string(),
            regions: vec![MarketRegion {
                name: "Test Region".to_string(),
                share: "100%".to_string(),
                growth: "+1.0%".to_string(),
            }],
            last_updated: Utc::now(),
        })
    }

    pub fn community() -> DataPayload {
        DataPayload::Community(CommunityData {
            total_members: 10,
            active_predictors: 4,
            accuracy_rate: "80.0%".to_string(),
            last_updated: Utc::now(),
        })
    }

    pub fn insights() -> DataPayload {
        DataPayload::Insights(InsightsData {
            insights: vec![Insight {
                id: 1,
                title: "Test insight".to_string(),
                description: "Used in tests".to_string(),
                impact: "Low".to_string(),
                category: "Testing".to_string(),
                date: "2025-01-01".to_string(),
                source: "test".to_string(),
            }],
            last_updated: Utc::now(),
        })
    }

    /// A small payload of the right shape for `data_type`
    pub fn for_type(data_type: DataType) -> DataPayload {
        match data_type {
            DataType::Trends => Self::trends(1),
            DataType::Products => Self::products(),
            DataType::Market => Self::market(),
            DataType::Community => Self::community(),
            DataType::Insights => Self::insights(),
        }
    }
}
