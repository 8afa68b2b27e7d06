//! Configuration types

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Listener configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Router configuration
    #[serde(default)]
    pub router: RouterSettings,

    /// Built-in middleware configuration
    #[serde(default)]
    pub middleware: MiddlewareConfig,
}

/// Listener configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen")]
    pub listen: SocketAddr,

    /// Graceful shutdown timeout (wait for in-flight requests)
    #[serde(default = "default_shutdown_timeout", with = "humantime_serde")]
    pub shutdown_timeout: Duration,

    /// Max request body size (bytes)
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            shutdown_timeout: default_shutdown_timeout(),
            max_body_size: default_max_body_size(),
        }
    }
}

/// Router configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RouterSettings {
    /// Maximum number of idle request contexts kept for reuse
    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle: usize,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            pool_max_idle: default_pool_max_idle(),
        }
    }
}

/// Built-in middleware configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MiddlewareConfig {
    /// Request logging
    #[serde(default)]
    pub logging: LoggingSettings,

    /// Panic and error recovery
    #[serde(default)]
    pub recovery: RecoverySettings,

    /// Request ID injection
    #[serde(default)]
    pub request_id: RequestIdSettings,

    /// Request deadline, disabled when absent
    #[serde(default)]
    pub timeout: Option<TimeoutSettings>,

    /// Bearer token authentication, disabled when absent
    #[serde(default)]
    pub auth: Option<AuthSettings>,
}

/// Request logging settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    /// Enable request logging
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Level request events are emitted at (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log request headers
    #[serde(default)]
    pub log_headers: bool,

    /// Extra headers to redact, on top of the built-in list
    #[serde(default)]
    pub sensitive_headers: Vec<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            log_headers: false,
            sensitive_headers: Vec::new(),
        }
    }
}

/// Recovery settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecoverySettings {
    /// Enable recovery
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Put error messages in 500 response bodies
    #[serde(default)]
    pub expose_errors: bool,
}

impl Default for RecoverySettings {
    fn default() -> Self {
        Self {
            enabled: true,
            expose_errors: false,
        }
    }
}

/// Request ID settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestIdSettings {
    /// Enable request IDs
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Header carrying the ID
    #[serde(default = "default_request_id_header")]
    pub header: String,
}

impl Default for RequestIdSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            header: default_request_id_header(),
        }
    }
}

/// Timeout settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeoutSettings {
    /// Deadline for handling a request
    #[serde(with = "humantime_serde")]
    pub duration: Duration,

    /// Body of the 504 response
    #[serde(default)]
    pub message: Option<String>,
}

/// Bearer authentication settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSettings {
    /// Accepted bearer tokens
    pub tokens: Vec<String>,

    /// Paths served without a token; a trailing `*` matches a prefix
    #[serde(default)]
    pub skip_paths: Vec<String>,

    /// Realm reported in the challenge
    #[serde(default)]
    pub realm: Option<String>,
}

fn default_listen() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_body_size() -> usize {
    10 * 1024 * 1024 // 10 MB
}

fn default_pool_max_idle() -> usize {
    1024
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_id_header() -> String {
    "X-Request-ID".to_string()
}
