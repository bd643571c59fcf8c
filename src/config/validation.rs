use crate::config::types::{Config, FetchConfig, IgnoreConfig, MirrorConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound for the raw request timeout (seconds)
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

/// Upper bound for the post-load settle delay (milliseconds)
const MAX_SETTLE_DELAY_MS: u64 = 60_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_mirror_config(&config.mirror)?;
    validate_fetch_config(&config.fetch)?;
    validate_ignore_config(&config.ignore)?;
    Ok(())
}

/// Validates output and traversal settings
fn validate_mirror_config(config: &MirrorConfig) -> Result<(), ConfigError> {
    if config.output_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output_dir cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates network and browser settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.request_timeout_secs < 1 || config.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be between 1 and {}, got {}",
            MAX_REQUEST_TIMEOUT_SECS, config.request_timeout_secs
        )));
    }

    if config.settle_delay_ms > MAX_SETTLE_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "settle_delay_ms must be <= {}ms, got {}ms",
            MAX_SETTLE_DELAY_MS, config.settle_delay_ms
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates that every ignore pattern is a usable glob
fn validate_ignore_config(config: &IgnoreConfig) -> Result<(), ConfigError> {
    for pattern in &config.patterns {
        validate_ignore_pattern(pattern)?;
    }

    Ok(())
}

/// Validates a single glob pattern
fn validate_ignore_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Pattern cannot be empty".to_string(),
        ));
    }

    glob::Pattern::new(pattern)
        .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))?;

    Ok(())
}

/// Validates the seed URL a crawl starts from
///
/// The seed must parse, use `http` or `https`, and carry a host.
pub fn validate_seed_url(seed: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' must use the http or https scheme",
            seed
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            seed
        )));
    }

    Ok(url)
}
