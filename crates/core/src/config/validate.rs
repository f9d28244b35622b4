use super::{types::Config, ConfigError};

/// Validate a loaded configuration beyond what deserialization enforces.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.aging.base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "aging.base_url must not be empty".to_string(),
        ));
    }

    if !config.aging.base_url.starts_with("http://") && !config.aging.base_url.starts_with("https://")
    {
        return Err(ConfigError::ValidationError(format!(
            "aging.base_url must be an http(s) URL, got {:?}",
            config.aging.base_url
        )));
    }

    if config.aging.api_key.is_empty() {
        return Err(ConfigError::ValidationError(
            "aging.api_key must not be empty".to_string(),
        ));
    }

    if config.upload.max_upload_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "upload.max_upload_bytes must be positive".to_string(),
        ));
    }

    if config.poller.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "poller.poll_interval_ms must be positive".to_string(),
        ));
    }

    if config.poller.max_poll_duration_secs == 0 {
        return Err(ConfigError::ValidationError(
            "poller.max_poll_duration_secs must be positive".to_string(),
        ));
    }

    if config.poller.poll_interval_ms > config.poller.max_poll_duration_secs * 1000 {
        return Err(ConfigError::ValidationError(
            "poller.poll_interval_ms exceeds the poll duration bound".to_string(),
        ));
    }

    if config.storage.public_base_url.is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.public_base_url must not be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn valid_config() -> Config {
        load_config_from_str(
            r#"
[aging]
base_url = "https://api.agify.example/v1"
api_key = "secret"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_valid_config_passes() {
        validate_config(&valid_config()).unwrap();
    }

    #[test]
    fn test_empty_api_key_fails() {
        let mut config = valid_config();
        config.aging.api_key = String::new();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_non_http_base_url_fails() {
        let mut config = valid_config();
        config.aging.base_url = "ftp://api.agify.example".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_interval_larger_than_deadline_fails() {
        let mut config = valid_config();
        config.poller.poll_interval_ms = 60_000;
        config.poller.max_poll_duration_secs = 30;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_upload_limit_fails() {
        let mut config = valid_config();
        config.upload.max_upload_bytes = 0;
        assert!(validate_config(&config).is_err());
    }
}
