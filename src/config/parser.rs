use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;
use validator::Validate;

use super::models::TrendvaultConfig;

/// Errors that can occur during configuration parsing
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to open config file: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Configuration validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Configuration error: {0}")]
    Other(String),
}

/// Provides default configuration file path
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".trendvault").join("config.yaml"))
        .ok_or_else(|| ConfigError::Other("Could not determine home directory".to_string()))
}

/// Parses and validates configuration from YAML text
pub fn parse_config(content: &str) -> Result<TrendvaultConfig, ConfigError> {
    let config: TrendvaultConfig = serde_yaml::from_str(content)?;

    config.validate()?;

    // Each data type may be seeded at most once
    let mut seen = HashSet::new();
    for seed in &config.update_configs {
        if !seen.insert(seed.data_type) {
            return Err(ConfigError::Other(format!(
                "Data type '{}' appears more than once in update_configs",
                seed.data_type
            )));
        }
    }

    for (name, url) in &config.sources.http_overrides {
        url::Url::parse(url).map_err(|e| {
            ConfigError::Other(format!("Source '{name}' has an invalid URL '{url}': {e}"))
        })?;
    }

    if config.database.min_connections > config.database.max_connections {
        return Err(ConfigError::Other(format!(
            "database.min_connections ({}) exceeds database.max_connections ({})",
            config.database.min_connections, config.database.max_connections
        )));
    }

    Ok(config)
}

/// Loads and validates the trendvault configuration
pub fn load_config<P: AsRef<Path>>(config_path: P) -> Result<TrendvaultConfig, ConfigError> {
    let mut file = File::open(&config_path)?;

    let mut content = String::new();
    file.read_to_string(&mut content)?;

    parse_config(&content)
}

/// Like [`load_config`], but a missing file yields the built-in defaults
pub fn load_or_default<P: AsRef<Path>>(config_path: P) -> Result<TrendvaultConfig, ConfigError> {
    let path = config_path.as_ref();
    if !path.exists() {
        info!(
            "No configuration file at {}, using built-in defaults",
            path.display()
        );
        return Ok(TrendvaultConfig::default());
    }
    load_config(path)
}
