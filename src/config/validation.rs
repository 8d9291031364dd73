use crate::config::types::{Config, CrawlerConfig, DestinationConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    if let Some(destination) = &config.destination {
        validate_destination(destination)?;
    }
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_http_url("start_url", &config.start_url)?;

    let prefix = &config.recipe_path_prefix;
    if !prefix.starts_with('/') || !prefix.ends_with('/') || prefix.len() < 2 {
        return Err(ConfigError::Validation(format!(
            "recipe_path_prefix must start and end with '/', got '{}'",
            prefix
        )));
    }

    if config.max_concurrency < 1 || config.max_concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "max_concurrency must be between 1 and 64, got {}",
            config.max_concurrency
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.claim_timeout_ms < 10 {
        return Err(ConfigError::Validation(format!(
            "claim_timeout_ms must be >= 10ms, got {}ms",
            config.claim_timeout_ms
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.recipes_path.is_empty() {
        return Err(ConfigError::Validation(
            "recipes_path cannot be empty".to_string(),
        ));
    }

    if config.destination_path.is_empty() {
        return Err(ConfigError::Validation(
            "destination_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a destination at the boundary where it enters the system.
///
/// An empty endpoint or credential is allowed: it means "unconfigured" and
/// turns the export into a no-op rather than an error.
pub fn validate_destination(destination: &DestinationConfig) -> Result<(), ConfigError> {
    if !destination.endpoint.trim().is_empty() {
        validate_http_url("endpoint", &destination.endpoint)?;
    }

    if !destination.rate_limit_seconds.is_finite() || destination.rate_limit_seconds < 0.0 {
        return Err(ConfigError::Validation(format!(
            "rate_limit_seconds must be a non-negative number, got {}",
            destination.rate_limit_seconds
        )));
    }

    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' has no host",
            field, value
        )));
    }

    Ok(())
}
