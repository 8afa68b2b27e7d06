//! Configuration validation

use crate::Config;
use switchyard_core::{Error, Result};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_server(config)?;
    validate_middleware(config)?;
    Ok(())
}

fn validate_server(config: &Config) -> Result<()> {
    if config.server.shutdown_timeout.is_zero() {
        return Err(Error::Config("shutdown_timeout must be > 0".to_string()));
    }

    if config.server.max_body_size == 0 {
        return Err(Error::Config("max_body_size must be > 0".to_string()));
    }

    if config.router.pool_max_idle == 0 {
        tracing::warn!("router.pool_max_idle is 0, request contexts will not be reused");
    }

    Ok(())
}

fn validate_middleware(config: &Config) -> Result<()> {
    let middleware = &config.middleware;

    let level = middleware.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(Error::Config(format!(
            "Invalid logging level: {} (must be one of {})",
            middleware.logging.level,
            LOG_LEVELS.join(", ")
        )));
    }

    let header = &middleware.request_id.header;
    if header.is_empty()
        || !header
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    {
        return Err(Error::Config(format!(
            "Invalid request_id header name: '{header}'"
        )));
    }

    if let Some(timeout) = &middleware.timeout {
        if timeout.duration.is_zero() {
            return Err(Error::Config("timeout duration must be > 0".to_string()));
        }
        if timeout.duration.as_secs() > 300 {
            tracing::warn!("timeout duration is very high (>5 minutes)");
        }
    }

    if let Some(auth) = &middleware.auth {
        if auth.tokens.is_empty() {
            return Err(Error::Config(
                "auth requires at least one token".to_string(),
            ));
        }
        if auth.tokens.iter().any(|t| t.trim().is_empty()) {
            return Err(Error::Config("auth tokens cannot be empty".to_string()));
        }
        if let Some(path) = auth.skip_paths.iter().find(|p| !p.starts_with('/')) {
            return Err(Error::Config(format!(
                "auth skip path must start with '/': {path}"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuthSettings, TimeoutSettings};
    use std::time::Duration;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = Config::default();
        config.middleware.logging.level = "verbose".to_string();
        assert!(validate_config(&config).is_err());

        config.middleware.logging.level = "WARN".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_invalid_request_id_header() {
        let mut config = Config::default();
        config.middleware.request_id.header = "X Request ID".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_timeout() {
        let mut config = Config::default();
        config.middleware.timeout = Some(TimeoutSettings {
            duration: Duration::ZERO,
            message: None,
        });
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_auth_validation() {
        let mut config = Config::default();
        config.middleware.auth = Some(AuthSettings {
            tokens: vec![],
            skip_paths: vec![],
            realm: None,
        });
        assert!(validate_config(&config).is_err());

        config.middleware.auth = Some(AuthSettings {
            tokens: vec!["secret".to_string()],
            skip_paths: vec!["health".to_string()],
            realm: None,
        });
        assert!(validate_config(&config).is_err());

        config.middleware.auth = Some(AuthSettings {
            tokens: vec!["secret".to_string()],
            skip_paths: vec!["/health".to_string()],
            realm: None,
        });
        assert!(validate_config(&config).is_ok());
    }
}
