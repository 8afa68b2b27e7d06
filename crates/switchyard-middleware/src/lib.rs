//! # Switchyard Middleware
//!
//! Built-in middleware collection with:
//! - Request logging
//! - Panic and error recovery
//! - Timeout enforcement
//! - Request ID injection
//! - Bearer token authentication

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod auth;
pub mod builder;
pub mod logging;
pub mod recovery;
pub mod request_id;
pub mod timeout;

pub use auth::{BearerAuth, BearerAuthConfig};
pub use builder::MiddlewareBuilder;
pub use logging::{LoggingConfig, RequestLogger};
pub use recovery::Recovery;
pub use request_id::{IdGenerator, RequestId, RequestIdConfig};
pub use timeout::{Timeout, TimeoutConfig};

// Re-export core handler types from switchyard-core
pub use switchyard_core::handler::{Handler, Next};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::auth::{BearerAuth, BearerAuthConfig};
    pub use crate::builder::MiddlewareBuilder;
    pub use crate::logging::{LoggingConfig, RequestLogger};
    pub use crate::recovery::Recovery;
    pub use crate::request_id::{IdGenerator, RequestId, RequestIdConfig};
    pub use crate::timeout::{Timeout, TimeoutConfig};
    pub use switchyard_core::handler::{Handler, Next};
}
