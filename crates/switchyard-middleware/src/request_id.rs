//! Request ID middleware for request correlation

use async_trait::async_trait;
use http::header::{HeaderName, HeaderValue};
use std::fmt;
use switchyard_core::{Context, Handler, Next, Result};
use uuid::Uuid;

/// Request ID format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdGenerator {
    /// Hyphenated UUID v4
    #[default]
    UuidV4,
    /// UUID v4 without hyphens
    Simple,
}

impl IdGenerator {
    /// Generate a new ID
    pub fn generate(&self) -> String {
        match self {
            IdGenerator::UuidV4 => Uuid::new_v4().to_string(),
            IdGenerator::Simple => Uuid::new_v4().simple().to_string(),
        }
    }
}

/// Configuration for Request ID middleware
#[derive(Debug, Clone)]
pub struct RequestIdConfig {
    /// Header name for request ID
    pub header_name: String,
    /// ID generator strategy
    pub generator: IdGenerator,
    /// Whether to add request ID to response headers
    pub add_to_response: bool,
}

impl Default for RequestIdConfig {
    fn default() -> Self {
        Self {
            header_name: "X-Request-ID".to_string(),
            generator: IdGenerator::UuidV4,
            add_to_response: true,
        }
    }
}

/// Request ID middleware
///
/// Makes sure every request carries an ID header that later handlers can
/// read. An ID already present on the request is kept.
#[derive(Clone)]
pub struct RequestId {
    config: RequestIdConfig,
    header_name: HeaderName,
}

impl RequestId {
    /// Create a new Request ID middleware with default config
    pub fn new() -> Self {
        Self::with_config(RequestIdConfig::default())
    }

    /// Create a new Request ID middleware with custom config
    pub fn with_config(config: RequestIdConfig) -> Self {
        let header_name = HeaderName::from_bytes(config.header_name.as_bytes())
            .unwrap_or_else(|_| HeaderName::from_static("x-request-id"));

        Self {
            config,
            header_name,
        }
    }

    /// Header the ID is read from and written to
    pub fn header_name(&self) -> &HeaderName {
        &self.header_name
    }

    fn generate_id(&self) -> HeaderValue {
        let id = self.config.generator.generate();
        // UUIDs are plain ASCII
        HeaderValue::from_str(&id).unwrap_or_else(|_| HeaderValue::from_static("invalid"))
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestId")
            .field("header_name", &self.config.header_name)
            .field("generator", &self.config.generator)
            .finish()
    }
}

#[async_trait]
impl Handler for RequestId {
    async fn call(&self, ctx: &mut Context, next: Next) -> Result<()> {
        let existing = ctx.headers().get(&self.header_name).cloned();
        let request_id = match existing {
            Some(existing) => existing,
            None => {
                let id = self.generate_id();
                ctx.request_mut()
                    .headers_mut()
                    .insert(self.header_name.clone(), id.clone());
                id
            }
        };

        let result = next.run(ctx).await;

        // Set after the chain so a response reset downstream cannot drop it
        if self.config.add_to_response {
            ctx.response_mut()
                .header(self.header_name.clone(), request_id);
        }

        result
    }
}
