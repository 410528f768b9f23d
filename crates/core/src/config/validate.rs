use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Aggregator and provider timeouts are not 0
/// - Enabled providers have a base URL
/// - At least one provider is enabled
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.aggregator.timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "aggregator.timeout_ms cannot be 0".to_string(),
        ));
    }

    let providers = config.providers.summaries();
    for provider in providers.iter().filter(|p| p.enabled) {
        if provider.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(format!(
                "providers.{}.timeout_secs cannot be 0",
                provider.name
            )));
        }
        if provider.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "providers.{}.base_url cannot be empty",
                provider.name
            )));
        }
    }

    if !providers.iter().any(|p| p.enabled) {
        return Err(ConfigError::ValidationError(
            "at least one provider must be enabled".to_string(),
        ));
    }

    if config.cinemeta.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "cinemeta.timeout_secs cannot be 0".to_string(),
        ));
    }

    Ok(())
}
