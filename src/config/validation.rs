use crate::config::types::{Config, ResolverConfig, TransportConfig};
use crate::{ConfigError, ConfigResult};

/// Upper bound accepted for `max-redirects`
const MAX_REDIRECTS_CEILING: u32 = 100;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_resolver_config(&config.resolver)?;
    validate_transport_config(&config.transport)?;
    Ok(())
}

/// Validates resolver configuration
fn validate_resolver_config(config: &ResolverConfig) -> ConfigResult<()> {
    if config.max_redirects > MAX_REDIRECTS_CEILING {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be <= {}, got {}",
            MAX_REDIRECTS_CEILING, config.max_redirects
        )));
    }

    Ok(())
}

/// Validates transport configuration
fn validate_transport_config(config: &TransportConfig) -> ConfigResult<()> {
    validate_user_agent(&config.user_agent)?;

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    if config.connect_timeout_secs > config.timeout_secs {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs ({}) cannot exceed timeout_secs ({})",
            config.connect_timeout_secs, config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates a User-Agent value
fn validate_user_agent(user_agent: &str) -> ConfigResult<()> {
    if user_agent.trim().is_empty() {
        return Err(ConfigError::Validation("user_agent cannot be empty".to_string()));
    }

    // Must be sendable as a header value
    if user_agent.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(format!(
            "user_agent contains control characters: '{}'",
            user_agent.escape_default()
        )));
    }

    Ok(())
}
