use crate::config::types::{Config, CrawlerConfig, OutputConfig, RetryConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    validate_retry_config(&config.retry)?;
    validate_urls(&config.urls)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(ConfigError::Validation(
            "timeout_seconds must be > 0".to_string(),
        ));
    }

    validate_class_token(&config.container_class)?;

    Ok(())
}

/// Validates that the container class is a single class token
fn validate_class_token(class: &str) -> Result<(), ConfigError> {
    if class.is_empty() {
        return Err(ConfigError::Validation(
            "container_class cannot be empty".to_string(),
        ));
    }

    if class.chars().any(char::is_whitespace) {
        return Err(ConfigError::Validation(format!(
            "container_class must be a single class token, got '{}'",
            class
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the retry policy
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_retries > 0 && config.backoff_seconds == 0 {
        return Err(ConfigError::Validation(
            "backoff_seconds must be > 0 when max_retries is set".to_string(),
        ));
    }

    Ok(())
}

/// Validates the configured URL list
fn validate_urls(urls: &[String]) -> Result<(), ConfigError> {
    for raw in urls {
        let url = Url::parse(raw)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid URL '{}': {}", raw, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "URL '{}' must use http or https",
                raw
            )));
        }
    }

    Ok(())
}
