//! Timeout middleware for request handling deadlines

use async_trait::async_trait;
use http::StatusCode;
use std::fmt;
use std::time::Duration;
use switchyard_core::{Context, Handler, Next, Result};
use tokio::time::timeout;

/// Configuration for Timeout middleware
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Deadline for the rest of the chain
    pub request_timeout: Duration,
    /// Whether to return a custom error message
    pub custom_error_message: Option<String>,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            custom_error_message: None,
        }
    }
}

/// Timeout middleware
///
/// Races the rest of the chain against a deadline. If the deadline passes
/// first, the remaining handlers are dropped and a 504 Gateway Timeout
/// response replaces whatever they had written.
#[derive(Clone)]
pub struct Timeout {
    config: TimeoutConfig,
}

impl Timeout {
    /// Create a new Timeout middleware with default config (30s)
    pub fn new() -> Self {
        Self::with_config(TimeoutConfig::default())
    }

    /// Create a new Timeout middleware with custom config
    pub fn with_config(config: TimeoutConfig) -> Self {
        Self { config }
    }

    /// Create a new Timeout middleware with a specific duration
    pub fn with_duration(duration: Duration) -> Self {
        Self::with_config(TimeoutConfig {
            request_timeout: duration,
            custom_error_message: None,
        })
    }

    fn write_timeout_response(&self, ctx: &mut Context) {
        let message = self
            .config
            .custom_error_message
            .as_deref()
            .unwrap_or("Gateway Timeout");

        let response = ctx.response_mut();
        response.reset();
        response.text(StatusCode::GATEWAY_TIMEOUT, message);
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeout")
            .field("request_timeout", &self.config.request_timeout)
            .finish()
    }
}

#[async_trait]
impl Handler for Timeout {
    async fn call(&self, ctx: &mut Context, next: Next) -> Result<()> {
        match timeout(self.config.request_timeout, next.run(&mut *ctx)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    method = %ctx.method(),
                    path = %ctx.path(),
                    timeout_ms = self.config.request_timeout.as_millis(),
                    "Request timeout"
                );
                self.write_timeout_response(ctx);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use switchyard_core::{dispatch, Chain};

    #[derive(Debug)]
    struct SlowHandler {
        delay: Duration,
    }

    #[async_trait]
    impl Handler for SlowHandler {
        async fn call(&self, ctx: &mut Context, _next: Next) -> Result<()> {
            ctx.response_mut().write("partial ");
            tokio::time::sleep(self.delay).await;
            ctx.response_mut().text(StatusCode::OK, "success");
            Ok(())
        }
    }

    fn chain(timeout: Timeout, delay: Duration) -> Chain {
        Arc::new([
            Arc::new(timeout) as Arc<dyn Handler>,
            Arc::new(SlowHandler { delay }),
        ])
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_no_timeout() {
        let chain = chain(
            Timeout::with_duration(Duration::from_millis(100)),
            Duration::from_millis(10),
        );

        let mut ctx = Context::new();
        let outcome = dispatch(&chain, &mut ctx).await;

        assert!(outcome.is_completed());
        assert_eq!(ctx.response().status(), StatusCode::OK);
        assert_eq!(ctx.response().body(), b"success");
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_exceeded() {
        let chain = chain(
            Timeout::with_duration(Duration::from_millis(50)),
            Duration::from_millis(200),
        );

        let mut ctx = Context::new();
        let outcome = dispatch(&chain, &mut ctx).await;

        assert!(outcome.is_aborted());
        assert_eq!(ctx.response().status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(ctx.response().body(), b"Gateway Timeout");
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_error_message() {
        let config = TimeoutConfig {
            request_timeout: Duration::from_millis(10),
            custom_error_message: Some("took too long".to_string()),
        };
        let chain = chain(Timeout::with_config(config), Duration::from_secs(1));

        let mut ctx = Context::new();
        dispatch(&chain, &mut ctx).await;

        assert_eq!(ctx.response().body(), b"took too long");
    }
}
