//! Route definition

use crate::pattern::Pattern;
use http::Method;
use std::fmt;
use std::sync::Arc;
use switchyard_core::Chain;

/// A registered route: method, full pattern and resolved handler chain
#[derive(Clone)]
pub struct Route {
    method: Method,
    pattern: Pattern,
    path: Arc<str>,
    chain: Chain,
}

impl Route {
    /// Create a route from a compiled pattern and its fully resolved chain
    pub fn new(method: Method, pattern: Pattern, chain: Chain) -> Self {
        let path = Arc::from(pattern.to_string());
        Self {
            method,
            pattern,
            path,
            chain,
        }
    }

    /// HTTP method
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Compiled pattern
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Canonical pattern string, e.g. `/users/:id`
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Shared canonical pattern string
    pub fn path_arc(&self) -> Arc<str> {
        Arc::clone(&self.path)
    }

    /// Handler chain: global, group and route handlers in order
    pub fn chain(&self) -> &Chain {
        &self.chain
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("handlers", &self.chain.len())
            .finish()
    }
}
