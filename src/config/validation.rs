use crate::config::types::{Config, FeedConfig, RunConfig, SiteConfig, StorageConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_storage_config(&config.storage)?;
    validate_feed_config(&config.feed)?;
    validate_run_config(&config.run)?;

    if let Some(endpoint) = &config.heartbeat.endpoint {
        validate_http_url("heartbeat.endpoint", endpoint)?;
    }

    Ok(())
}

fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_http_url("site.base-url", &config.base_url)?;

    if !(5..=10).contains(&config.timeout_secs) {
        return Err(ConfigError::Validation(format!(
            "site.timeout-secs must be between 5 and 10, got {}",
            config.timeout_secs
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "site.user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    validate_bucket_name(&config.bucket)?;

    if config.strips_prefix().is_empty() {
        return Err(ConfigError::Validation(
            "storage.strips-dir cannot be empty".to_string(),
        ));
    }

    if let Some(endpoint) = &config.endpoint_url {
        validate_http_url("storage.endpoint-url", endpoint)?;
    }

    if let Some(public_url) = &config.public_url {
        validate_http_url("storage.public-url", public_url)?;
    }

    Ok(())
}

fn validate_feed_config(config: &FeedConfig) -> Result<(), ConfigError> {
    let path = config.path.trim_matches('/');
    if path.is_empty() {
        return Err(ConfigError::Validation(
            "feed.path cannot be empty".to_string(),
        ));
    }

    if config.length < 1 || config.length > 365 {
        return Err(ConfigError::Validation(format!(
            "feed.length must be between 1 and 365, got {}",
            config.length
        )));
    }

    if config.concurrency < 1 || config.concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "feed.concurrency must be between 1 and 64, got {}",
            config.concurrency
        )));
    }

    validate_http_url("feed.link", &config.link)?;

    Ok(())
}

fn validate_run_config(config: &RunConfig) -> Result<(), ConfigError> {
    if config.deadline_secs < 1 || config.deadline_secs > 900 {
        return Err(ConfigError::Validation(format!(
            "run.deadline-secs must be between 1 and 900, got {}",
            config.deadline_secs
        )));
    }

    Ok(())
}

/// Basic S3 bucket naming rules: 3-63 chars of lowercase letters, digits, dots and hyphens
fn validate_bucket_name(bucket: &str) -> Result<(), ConfigError> {
    if bucket.is_empty() {
        return Err(ConfigError::Missing("storage.bucket".to_string()));
    }

    if bucket.len() < 3 || bucket.len() > 63 {
        return Err(ConfigError::Validation(format!(
            "storage.bucket must be 3 to 63 characters long, got '{}'",
            bucket
        )));
    }

    if !bucket
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "storage.bucket contains invalid characters: '{}'",
            bucket
        )));
    }

    if bucket.starts_with(['.', '-']) || bucket.ends_with(['.', '-']) {
        return Err(ConfigError::Validation(format!(
            "storage.bucket cannot start or end with '.' or '-': '{}'",
            bucket
        )));
    }

    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", field, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            field, value
        )));
    }

    Ok(())
}
