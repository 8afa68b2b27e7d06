//! # Switchyard Core
//!
//! Core types for the Switchyard request router:
//! - Handler trait and the cooperative chain executor
//! - Per-request context and its pool
//! - Response sink
//! - Error types

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod context;
pub mod error;
pub mod handler;
pub mod pool;
pub mod response;

pub use context::{ChainState, Context, Param, Params};
pub use error::{Error, PatternError, RegistrationError, Result};
pub use handler::{dispatch, dispatch_isolated, panic_message, Chain, Handler, Next, Outcome};
pub use pool::{ContextPool, PooledContext};
pub use response::{Body, ResponseWriter};

// Re-export commonly used types
pub use async_trait::async_trait;
pub use bytes::Bytes;
pub use http::{Method, Request, Response, StatusCode};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::context::{Context, Params};
    pub use crate::error::{Error, Result};
    pub use crate::handler::{Chain, Handler, Next, Outcome};
    pub use crate::response::{Body, ResponseWriter};
    pub use async_trait::async_trait;
}
