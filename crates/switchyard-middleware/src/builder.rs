//! Middleware stack builder
//!
//! Collects middleware in order, ready to hand to `Router::use_all` or a
//! group's `use_all`.

use crate::*;
use std::sync::Arc;
use std::time::Duration;
use switchyard_core::Handler;

/// Middleware stack builder
#[derive(Debug, Default)]
pub struct MiddlewareBuilder {
    middlewares: Vec<Arc<dyn Handler>>,
}

impl MiddlewareBuilder {
    /// Create a new middleware builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            middlewares: Vec::new(),
        }
    }

    /// Add Recovery middleware
    #[must_use]
    pub fn with_recovery(mut self) -> Self {
        self.middlewares.push(Arc::new(Recovery::new()));
        self
    }

    /// Add Request ID middleware
    #[must_use]
    pub fn with_request_id(mut self) -> Self {
        self.middlewares.push(Arc::new(RequestId::new()));
        self
    }

    /// Add Request ID middleware with custom configuration
    #[must_use]
    pub fn with_request_id_config(mut self, config: RequestIdConfig) -> Self {
        self.middlewares
            .push(Arc::new(RequestId::with_config(config)));
        self
    }

    /// Add Timeout middleware with default config (30s timeout)
    #[must_use]
    pub fn with_timeout(mut self) -> Self {
        self.middlewares.push(Arc::new(Timeout::new()));
        self
    }

    /// Add Timeout middleware with custom duration
    #[must_use]
    pub fn with_timeout_duration(mut self, timeout: Duration) -> Self {
        self.middlewares
            .push(Arc::new(Timeout::with_duration(timeout)));
        self
    }

    /// Add Timeout middleware with custom configuration
    #[must_use]
    pub fn with_timeout_config(mut self, config: TimeoutConfig) -> Self {
        self.middlewares
            .push(Arc::new(Timeout::with_config(config)));
        self
    }

    /// Add Logging middleware
    #[must_use]
    pub fn with_logging(mut self) -> Self {
        self.middlewares.push(Arc::new(RequestLogger::new()));
        self
    }

    /// Add Logging middleware with custom configuration
    #[must_use]
    pub fn with_logging_config(mut self, config: LoggingConfig) -> Self {
        self.middlewares
            .push(Arc::new(RequestLogger::with_config(config)));
        self
    }

    /// Add Bearer authentication middleware
    #[must_use]
    pub fn with_bearer_auth(mut self, config: BearerAuthConfig) -> Self {
        self.middlewares
            .push(Arc::new(BearerAuth::with_config(config)));
        self
    }

    /// Add custom middleware
    #[must_use]
    pub fn with_middleware(mut self, middleware: Arc<dyn Handler>) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Build the middleware stack, in the order it was added
    #[must_use]
    pub fn build(self) -> Vec<Arc<dyn Handler>> {
        self.middlewares
    }

    /// Get the number of middlewares in the stack
    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Check if the stack is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}
