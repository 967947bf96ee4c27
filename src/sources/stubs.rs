use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::{DataSource, SourceFetchError, SourcePayload};
use crate::models::{
    NewsArticle, ProductListing, ProductPricing, RetailerOffer, ReviewSummary, SalesCategory,
    SourceRecords, TrendSignal,
};

/// Fixed-latency source answering with literal records
pub struct StubSource {
    name: String,
    latency: Duration,
    records: fn() -> SourceRecords,
}

impl StubSource {
    pub fn new(name: impl Into<String>, latency: Duration, records: fn() -> SourceRecords) -> Self {
        Self {
            name: name.into(),
            latency,
            records,
        }
    }
}

#[async_trait]
impl DataSource for StubSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<SourcePayload, SourceFetchError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        debug!("Stub source '{}' answered", self.name);
        Ok(SourcePayload {
            source: self.name.clone(),
            fetched_at: Utc::now(),
            records: (self.records)(),
        })
    }
}

pub fn trend_sources(latency: Duration) -> Vec<Arc<dyn DataSource>> {
    vec![
        Arc::new(StubSource::new("google-trends", latency, google_trends)),
        Arc::new(StubSource::new("social-media", latency, social_media)),
        Arc::new(StubSource::new("beauty-news", latency, beauty_news)),
        Arc::new(StubSource::new("retail-data", latency, retail_data)),
    ]
}

pub fn product_sources(latency: Duration) -> Vec<Arc<dyn DataSource>> {
    vec![
        Arc::new(StubSource::new("brand-apis", latency, brand_catalog)),
        Arc::new(StubSource::new("retailer-apis", latency, retailer_pricing)),
        Arc::new(StubSource::new("review-sites", latency, review_sites)),
    ]
}

pub fn google_trends() -> SourceRecords {
    SourceRecords::Trends(vec![
        TrendSignal::Keyword {
            keyword: "glass skin".to_string(),
            interest: 94,
            growth: "+23%".to_string(),
            region: "global".to_string(),
        },
        TrendSignal::Keyword {
            keyword: "fermented skincare".to_string(),
            interest: 91,
            growth: "+34%".to_string(),
            region: "asia".to_string(),
        },
    ])
}

pub fn social_media() -> SourceRecords {
    SourceRecords::Trends(vec![
        TrendSignal::Hashtag {
            hashtag: "#kbeauty".to_string(),
            mentions: 2_400_000,
            growth: "+15%".to_string(),
            platforms: vec![
                "instagram".to_string(),
                "tiktok".to_string(),
                "youtube".to_string(),
            ],
        },
        TrendSignal::Hashtag {
            hashtag: "#glassskin".to_string(),
            mentions: 890_000,
            growth: "+28%".to_string(),
            platforms: vec!["instagram".to_string(), "tiktok".to_string()],
        },
    ])
}

pub fn beauty_news() -> SourceRecords {
    SourceRecords::Articles(vec![NewsArticle {
        title: "AI-Powered Skincare Takes Center Stage".to_string(),
        sentiment: "positive".to_string(),
        mentions: 156,
        published_at: Utc::now(),
    }])
}

pub fn retail_data() -> SourceRecords {
    SourceRecords::Sales(vec![
        SalesCategory {
            category: "serums".to_string(),
            growth: "+45%".to_string(),
            top_brands: vec![
                "COSRX".to_string(),
                "Beauty of Joseon".to_string(),
                "Torriden".to_string(),
            ],
        },
        SalesCategory {
            category: "vegan-products".to_string(),
            growth: "+67%".to_string(),
            top_brands: vec![
                "Dear Klairs".to_string(),
                "Purito".to_string(),
                "By Wishtrend".to_string(),
            ],
        },
    ])
}

pub fn brand_catalog() -> SourceRecords {
    SourceRecords::Products(vec![ProductListing {
        id: "cosrx-snail-essence".to_string(),
        name: "COSRX Snail 96 Mucin Power Essence".to_string(),
        price: "$25".to_string(),
        rating: 4.5,
        reviews: 15_680,
        in_stock: true,
        last_updated: Utc::now(),
    }])
}

pub fn retailer_pricing() -> SourceRecords {
    SourceRecords::Pricing(vec![ProductPricing {
        product_id: "cosrx-snail-essence".to_string(),
        retailers: vec![
            RetailerOffer {
                name: "Sephora".to_string(),
                price: "$25".to_string(),
                in_stock: true,
            },
            RetailerOffer {
                name: "Ulta".to_string(),
                price: "$24".to_string(),
                in_stock: true,
            },
        ],
    }])
}

pub fn review_sites() -> SourceRecords {
    SourceRecords::Reviews(vec![ReviewSummary {
        product_id: "cosrx-snail-essence".to_string(),
        average_rating: 4.5,
        review_count: 15_680,
        sentiment: "positive".to_string(),
        last_scraped: Utc::now(),
    }])
}
