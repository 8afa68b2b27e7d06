//! Request/Response logging middleware

use async_trait::async_trait;
use std::fmt;
use std::time::Instant;
use switchyard_core::{Context, Handler, Next, Result};
use tracing::Level;

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for requests
    pub log_level: Level,
    /// Whether to log request headers
    pub log_headers: bool,
    /// Headers to redact (e.g., Authorization, Cookie)
    pub sensitive_headers: Vec<String>,
    /// Whether to log response status
    pub log_response: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            log_headers: false,
            sensitive_headers: vec![
                "authorization".to_string(),
                "cookie".to_string(),
                "set-cookie".to_string(),
                "x-api-key".to_string(),
            ],
            log_response: true,
        }
    }
}

/// Emit an event at a level chosen at runtime
macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            Level::TRACE => tracing::trace!($($arg)+),
            Level::DEBUG => tracing::debug!($($arg)+),
            Level::INFO => tracing::info!($($arg)+),
            Level::WARN => tracing::warn!($($arg)+),
            Level::ERROR => tracing::error!($($arg)+),
        }
    };
}

/// Request/Response logging middleware
///
/// Logs the method, path, bound route parameters and matched pattern of
/// each request, then the response status and duration once the rest of
/// the chain has returned. Sensitive header values are redacted.
#[derive(Clone)]
pub struct RequestLogger {
    config: LoggingConfig,
}

impl RequestLogger {
    /// Create a new RequestLogger with default config
    pub fn new() -> Self {
        Self::with_config(LoggingConfig::default())
    }

    /// Create a new RequestLogger with custom config
    pub fn with_config(config: LoggingConfig) -> Self {
        Self { config }
    }

    /// Check if a header should be redacted
    fn should_redact(&self, header_name: &str) -> bool {
        self.config
            .sensitive_headers
            .iter()
            .any(|h| h.eq_ignore_ascii_case(header_name))
    }

    /// Redact a header value
    fn redact_value(&self, header_name: &str, value: &str) -> String {
        if self.should_redact(header_name) {
            "[REDACTED]".to_string()
        } else {
            value.to_string()
        }
    }

    fn headers(&self, ctx: &Context) -> Vec<String> {
        ctx.headers()
            .iter()
            .map(|(name, value)| {
                let value = value.to_str().unwrap_or("[invalid UTF-8]");
                format!("{}: {}", name, self.redact_value(name.as_str(), value))
            })
            .collect()
    }
}

impl Default for RequestLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestLogger")
            .field("log_level", &self.config.log_level)
            .field("log_headers", &self.config.log_headers)
            .field("log_response", &self.config.log_response)
            .finish()
    }
}

#[async_trait]
impl Handler for RequestLogger {
    async fn call(&self, ctx: &mut Context, next: Next) -> Result<()> {
        let method = ctx.method().clone();
        let path = ctx.path().to_string();
        let route = ctx.route_pattern().unwrap_or("-").to_string();
        let params: Vec<String> = ctx
            .params()
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();

        if self.config.log_headers {
            let headers = self.headers(ctx);
            log_at!(
                self.config.log_level,
                method = %method,
                path = %path,
                route = %route,
                params = ?params,
                headers = ?headers,
                "Incoming request"
            );
        } else {
            log_at!(
                self.config.log_level,
                method = %method,
                path = %path,
                route = %route,
                params = ?params,
                "Incoming request"
            );
        }

        let start = Instant::now();
        let result = next.run(ctx).await;
        let duration = start.elapsed();

        match &result {
            Ok(()) => {
                if self.config.log_response {
                    log_at!(
                        self.config.log_level,
                        method = %method,
                        path = %path,
                        route = %route,
                        status = ctx.response().status().as_u16(),
                        duration_ms = duration.as_millis(),
                        "Request completed"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    method = %method,
                    path = %path,
                    route = %route,
                    error = %e,
                    duration_ms = duration.as_millis(),
                    "Request failed"
                );
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use std::sync::Arc;
    use switchyard_core::{dispatch, Chain, Error, Request};

    #[derive(Debug)]
    struct TestHandler {
        status: StatusCode,
    }

    #[async_trait]
    impl Handler for TestHandler {
        async fn call(&self, ctx: &mut Context, _next: Next) -> Result<()> {
            ctx.response_mut().text(self.status, "test response");
            Ok(())
        }
    }

    fn context(uri: &str) -> Context {
        let request = Request::builder()
            .uri(uri)
            .header("Authorization", "Bearer secret")
            .header("Content-Type", "application/json")
            .body(Default::default())
            .unwrap();
        Context::with_request(request)
    }

    #[tokio::test]
    async fn test_request_logging() {
        let chain: Chain = Arc::new([
            Arc::new(RequestLogger::new()) as Arc<dyn Handler>,
            Arc::new(TestHandler {
                status: StatusCode::CREATED,
            }),
        ]);

        let mut ctx = context("/test");
        let outcome = dispatch(&chain, &mut ctx).await;

        assert!(outcome.is_completed());
        assert_eq!(ctx.response().status(), StatusCode::CREATED);
    }

    #[test]
    fn test_sensitive_header_redaction() {
        let logger = RequestLogger::new();

        assert_eq!(
            logger.redact_value("Authorization", "Bearer token123"),
            "[REDACTED]"
        );
        assert_eq!(logger.redact_value("Cookie", "session=abc"), "[REDACTED]");
        assert_eq!(
            logger.redact_value("Content-Type", "application/json"),
            "application/json"
        );

        let headers = logger.headers(&context("/"));
        assert!(headers.contains(&"authorization: [REDACTED]".to_string()));
        assert!(headers.contains(&"content-type: application/json".to_string()));
    }

    #[tokio::test]
    async fn test_custom_logging_config() {
        let config = LoggingConfig {
            log_level: Level::DEBUG,
            log_headers: true,
            sensitive_headers: vec!["X-Custom-Token".to_string()],
            log_response: true,
        };

        let logger = RequestLogger::with_config(config);
        assert!(logger.should_redact("x-custom-token"));
        assert!(!logger.should_redact("authorization"));

        let chain: Chain = Arc::new([
            Arc::new(logger) as Arc<dyn Handler>,
            Arc::new(TestHandler {
                status: StatusCode::OK,
            }),
        ]);
        let mut ctx = context("/test");
        assert!(dispatch(&chain, &mut ctx).await.is_completed());
    }

    #[tokio::test]
    async fn test_error_passes_through() {
        #[derive(Debug)]
        struct ErrorHandler;

        #[async_trait]
        impl Handler for ErrorHandler {
            async fn call(&self, _ctx: &mut Context, _next: Next) -> Result<()> {
                Err(Error::handler("backend failed"))
            }
        }

        let chain: Chain = Arc::new([
            Arc::new(RequestLogger::new()) as Arc<dyn Handler>,
            Arc::new(ErrorHandler),
        ]);

        let mut ctx = context("/test");
        let outcome = dispatch(&chain, &mut ctx).await;
        assert!(outcome.is_failed());
    }
}
