use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;
use validator::{Validate, ValidationError};

use crate::constants::{aggregation, database, network, retention};
use crate::models::{DataType, UpdateConfig};

/// The main configuration structure for trendvault
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TrendvaultConfig {
    /// HTTP trigger surface
    #[serde(default)]
    #[validate]
    pub server: ServerConfig,

    /// Connection pool settings
    #[serde(default)]
    #[validate]
    pub database: DatabaseConfig,

    /// Retention windows for versions, logs, metrics and the archive
    #[serde(default)]
    #[validate]
    pub retention: RetentionConfig,

    /// Scheduling policy seeds; data types not listed use built-in defaults
    #[serde(default)]
    #[validate]
    pub update_configs: Vec<UpdateConfigSeed>,

    /// Upstream source settings
    #[serde(default)]
    pub sources: SourcesConfig,

    /// In-process cron for local development
    #[serde(default)]
    #[validate]
    pub scheduler: SchedulerConfig,
}

impl TrendvaultConfig {
    /// One policy per data type, configured seeds overriding the defaults
    pub fn resolved_update_configs(&self) -> Vec<UpdateConfig> {
        DataType::ALL
            .iter()
            .map(|data_type| {
                match self.update_configs.iter().find(|s| s.data_type == *data_type) {
                    Some(seed) => seed.to_update_config(),
                    None => UpdateConfig::default_for(*data_type),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Socket address to listen on (default: "0.0.0.0:8080")
    #[serde(default = "default_bind_address")]
    #[validate(custom = "validate_socket_addr")]
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

fn default_bind_address() -> String {
    network::DEFAULT_BIND_ADDRESS.to_string()
}

fn validate_socket_addr(addr: &str) -> Result<(), ValidationError> {
    SocketAddr::from_str(addr)
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_bind_address"))
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    #[serde(default = "default_max_connections")]
    #[validate(range(min = 1, max = 100))]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    #[validate(range(max = 100))]
    pub min_connections: u32,

    /// Seconds to wait for a pooled connection
    #[serde(default = "default_connect_timeout")]
    #[validate(range(min = 1, max = 600))]
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_max_connections() -> u32 {
    database::MAX_POOL_SIZE
}

fn default_min_connections() -> u32 {
    database::MIN_POOL_SIZE
}

fn default_connect_timeout() -> u64 {
    database::CONNECTION_TIMEOUT_SECS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RetentionConfig {
    /// Inactive versions older than this move to the archive (default: 30)
    #[serde(default = "default_version_retention_days")]
    #[validate(range(min = 1, max = 3650))]
    pub version_retention_days: i64,

    /// Update logs older than this are deleted (default: 3)
    #[serde(default = "default_log_retention_months")]
    #[validate(range(min = 1, max = 120))]
    pub log_retention_months: u32,

    /// Quality metrics older than this are deleted (default: 6)
    #[serde(default = "default_metrics_retention_months")]
    #[validate(range(min = 1, max = 120))]
    pub metrics_retention_months: u32,

    /// Archived versions older than this are purged (default: 365)
    #[serde(default = "default_archive_retention_days")]
    #[validate(range(min = 1, max = 36500))]
    pub archive_retention_days: i64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            version_retention_days: default_version_retention_days(),
            log_retention_months: default_log_retention_months(),
            metrics_retention_months: default_metrics_retention_months(),
            archive_retention_days: default_archive_retention_days(),
        }
    }
}

fn default_version_retention_days() -> i64 {
    retention::VERSION_RETENTION_DAYS
}

fn default_log_retention_months() -> u32 {
    retention::LOG_RETENTION_MONTHS
}

fn default_metrics_retention_months() -> u32 {
    retention::METRICS_RETENTION_MONTHS
}

fn default_archive_retention_days() -> i64 {
    retention::ARCHIVE_RETENTION_DAYS
}

/// Seed for one row of `update_configs`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateConfigSeed {
    pub data_type: DataType,

    /// Source label stored with the policy (defaults per data type)
    pub source: Option<String>,

    #[validate(range(min = 1, max = 525600))]
    pub update_interval_minutes: i32,

    #[serde(default = "default_retry_attempts")]
    #[validate(range(min = 0, max = 10))]
    pub retry_attempts: i32,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl UpdateConfigSeed {
    pub fn to_update_config(&self) -> UpdateConfig {
        UpdateConfig {
            data_type: self.data_type,
            source: self
                .source
                .clone()
                .unwrap_or_else(|| self.data_type.default_config_source().to_string()),
            update_interval_minutes: self.update_interval_minutes,
            retry_attempts: self.retry_attempts,
            is_enabled: self.enabled,
            last_update: None,
            next_update: None,
        }
    }
}

fn default_retry_attempts() -> i32 {
    3
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Simulated latency of the literal stub sources (default: 50)
    #[serde(default = "default_stub_latency")]
    pub stub_latency_ms: u64,

    /// Source name to URL; a listed source is fetched over HTTP instead of stubbed
    #[serde(default)]
    pub http_overrides: HashMap<String, String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            stub_latency_ms: default_stub_latency(),
            http_overrides: HashMap::new(),
        }
    }
}

fn default_stub_latency() -> u64 {
    aggregation::DEFAULT_STUB_LATENCY_MS
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SchedulerConfig {
    /// Run the batch update and cleanup in-process (default: false)
    #[serde(default)]
    pub enabled: bool,

    /// Cron schedule for the batch update (default: "0 */15 * * * *")
    #[serde(default = "default_update_schedule")]
    #[validate(custom = "validate_cron_expression")]
    pub update_schedule: String,

    /// Cron schedule for the archive cleanup (default: "0 0 2 * * *")
    #[serde(default = "default_cleanup_schedule")]
    #[validate(custom = "validate_cron_expression")]
    pub cleanup_schedule: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            update_schedule: default_update_schedule(),
            cleanup_schedule: default_cleanup_schedule(),
        }
    }
}

fn default_update_schedule() -> String {
    "0 */15 * * * *".to_string()
}

fn default_cleanup_schedule() -> String {
    "0 0 2 * * *".to_string()
}

pub fn validate_cron_expression(expr: &str) -> Result<(), ValidationError> {
    cron::Schedule::from_str(expr)
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_cron_expression"))
}
