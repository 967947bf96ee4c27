#[cfg(test)]
mod tests {
    use std::io::Write;
    use tempfile::NamedTempFile;
    use crate::config::parser::{load_config, load_or_default, ConfigError};
    use crate::models::DataType;

    // Helper function to create a temporary file with content
    fn create_temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes()).expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    #[test]
    fn test_valid_configuration() {
        let config_yaml = r#"
        server:
          bind_address: 127.0.0.1:3000

        database:
          max_connections: 20
          min_connections: 4

        retention:
          version_retention_days: 14
          log_retention_months: 1

        update_configs:
          - data_type: trends
            update_interval_minutes: 30
            retry_attempts: 5
          - data_type: insights
            source: research-desk
            update_interval_minutes: 720
            enabled: false

        sources:
          stub_latency_ms: 0
          http_overrides:
            google-trends: https://trends.example.com/v1/kbeauty

        scheduler:
          enabled: true
          update_schedule: "0 */5 * * * *"
        "#;

        let temp_file = create_temp_file(config_yaml);
        let config = load_config(temp_file.path()).expect("Failed to load valid config");

        assert_eq!(config.server.bind_address, "127.0.0.1:3000");
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.database.min_connections, 4);
        assert_eq!(config.retention.version_retention_days, 14);
        assert_eq!(config.retention.log_retention_months, 1);
        // Unlisted retention fields keep their defaults
        assert_eq!(config.retention.metrics_retention_months, 6);
        assert_eq!(config.retention.archive_retention_days, 365);

        assert_eq!(config.update_configs.len(), 2);
        assert_eq!(config.sources.stub_latency_ms, 0);
        assert_eq!(
            config.sources.http_overrides.get("google-trends").map(String::as_str),
            Some("https://trends.example.com/v1/kbeauty")
        );

        assert!(config.scheduler.enabled);
        assert_eq!(config.scheduler.update_schedule, "0 */5 * * * *");
        assert_eq!(config.scheduler.cleanup_schedule, "0 0 2 * * *");
    }

    #[test]
    fn test_resolved_update_configs_merge_defaults() {
        let config_yaml = r#"
        update_configs:
          - data_type: market
            update_interval_minutes: 120
            retry_attempts: 1
          - data_type: insights
            source: research-desk
            update_interval_minutes: 720
            enabled: false
        "#;

        let temp_file = create_temp_file(config_yaml);
        let config = load_config(temp_file.path()).unwrap();
        let resolved = config.resolved_update_configs();

        assert_eq!(resolved.len(), 5);
        let types: Vec<DataType> = resolved.iter().map(|c| c.data_type).collect();
        assert_eq!(types, DataType::ALL.to_vec());

        let trends = &resolved[0];
        assert_eq!(trends.update_interval_minutes, 60);
        assert_eq!(trends.source, "k-beauty-api");

        let market = resolved.iter().find(|c| c.data_type == DataType::Market).unwrap();
        assert_eq!(market.update_interval_minutes, 120);
        assert_eq!(market.retry_attempts, 1);
        assert_eq!(market.source, "market-research-api");

        let insights = resolved.iter().find(|c| c.data_type == DataType::Insights).unwrap();
        assert_eq!(insights.source, "research-desk");
        assert!(!insights.is_enabled);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_or_default(dir.path().join("absent.yaml")).unwrap();

        assert_eq!(config.server.bind_address, "0.0.0.0:8080");
        assert_eq!(config.sources.stub_latency_ms, 50);
        assert!(config.update_configs.is_empty());
        assert_eq!(config.resolved_update_configs().len(), 5);
    }

    #[test]
    fn test_missing_file_is_error_for_load_config() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(ConfigError::FileError(_))));
    }

    #[test]
    fn test_unknown_data_type() {
        let config_yaml = r#"
        update_configs:
          - data_type: weather
            update_interval_minutes: 60
        "#;

        let temp_file = create_temp_file(config_yaml);
        let result = load_config(temp_file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_duplicate_data_type() {
        let config_yaml = r#"
        update_configs:
          - data_type: trends
            update_interval_minutes: 60
          - data_type: trends
            update_interval_minutes: 30
        "#;

        let temp_file = create_temp_file(config_yaml);
        let result = load_config(temp_file.path());

        if let Err(ConfigError::Other(err)) = result {
            assert!(err.contains("'trends' appears more than once"));
        } else {
            panic!("Expected Other error for duplicate data type");
        }
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config_yaml = r#"
        update_configs:
          - data_type: community
            update_interval_minutes: 0
        "#;

        let temp_file = create_temp_file(config_yaml);
        let result = load_config(temp_file.path());
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_invalid_cron_expression() {
        let config_yaml = r#"
        scheduler:
          enabled: true
          cleanup_schedule: "every night please"
        "#;

        let temp_file = create_temp_file(config_yaml);
        let result = load_config(temp_file.path());
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_invalid_bind_address() {
        let config_yaml = r#"
        server:
          bind_address: not-an-address
        "#;

        let temp_file = create_temp_file(config_yaml);
        let result = load_config(temp_file.path());
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_invalid_source_url() {
        let config_yaml = r#"
        sources:
          http_overrides:
            social-media: "::not a url::"
        "#;

        let temp_file = create_temp_file(config_yaml);
        let result = load_config(temp_file.path());
        assert!(matches!(result, Err(ConfigError::Other(_))));
    }

    #[test]
    fn test_pool_bounds_checked() {
        let config_yaml = r#"
        database:
          max_connections: 2
          min_connections: 5
        "#;

        let temp_file = create_temp_file(config_yaml);
        let result = load_config(temp_file.path());
        assert!(matches!(result, Err(ConfigError::Other(_))));
    }

    #[test]
    fn test_invalid_yaml() {
        let config_yaml = r#"
        retention:
          version_retention_days: 30
          - this is not valid yaml
        "#;

        let temp_file = create_temp_file(config_yaml);
        let result = load_config(temp_file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}
