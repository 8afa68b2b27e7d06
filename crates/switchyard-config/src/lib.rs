//! # Switchyard Configuration
//!
//! Configuration management with support for:
//! - Multiple formats (YAML, TOML, JSON)
//! - Environment variable expansion (`${VAR}`, `${VAR:-default}`)
//! - Validation
//! - Default values

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod builder;
pub mod format;
pub mod loader;
pub mod types;
pub mod validator;

pub use builder::ConfigBuilder;
pub use format::ConfigFormat;
pub use loader::{load_config, load_from_file, load_from_str};
pub use types::{
    AuthSettings, Config, LoggingSettings, MiddlewareConfig, RecoverySettings, RequestIdSettings,
    RouterSettings, ServerConfig, TimeoutSettings,
};
pub use validator::validate_config;
