//! Configuration builder

use crate::types::{AuthSettings, Config, TimeoutSettings};
use std::net::SocketAddr;
use std::time::Duration;
use switchyard_core::Result;

/// Builder for constructing configuration programmatically
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set listen address
    pub fn listen(mut self, addr: SocketAddr) -> Self {
        self.config.server.listen = addr;
        self
    }

    /// Set graceful shutdown timeout
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.config.server.shutdown_timeout = timeout;
        self
    }

    /// Set how many idle request contexts the router keeps
    pub fn pool_max_idle(mut self, max_idle: usize) -> Self {
        self.config.router.pool_max_idle = max_idle;
        self
    }

    /// Set the request logging level
    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.middleware.logging.level = level.into();
        self
    }

    /// Enable the request timeout middleware
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.config.middleware.timeout = Some(TimeoutSettings {
            duration,
            message: None,
        });
        self
    }

    /// Enable bearer authentication with these tokens
    pub fn bearer_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.middleware.auth = Some(AuthSettings {
            tokens: tokens.into_iter().map(Into::into).collect(),
            skip_paths: Vec::new(),
            realm: None,
        });
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<Config> {
        crate::validator::validate_config(&self.config)?;
        Ok(self.config)
    }
}
