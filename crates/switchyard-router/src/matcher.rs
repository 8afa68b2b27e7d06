//! Match results

use crate::route::Route;
use http::Method;
use std::fmt;
use std::sync::Arc;
use switchyard_core::Params;

/// Result of a successful route match
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// The matched route
    pub route: Arc<Route>,

    /// Extracted path parameters, in pattern order
    pub params: Params,
}

/// Why a request path did not resolve to a route.
///
/// Both cases are ordinary outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoMatch {
    /// No registered pattern matches the path
    NotFound,

    /// The path matches, but only for other methods
    MethodNotAllowed {
        /// Methods registered at the matched position, in registration order
        allowed: Vec<Method>,
    },
}

impl NoMatch {
    /// Value for an `Allow` header, e.g. `GET, POST`
    pub fn allow_header(&self) -> Option<String> {
        match self {
            NoMatch::NotFound => None,
            NoMatch::MethodNotAllowed { allowed } => Some(allow_header_value(allowed)),
        }
    }
}

impl fmt::Display for NoMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoMatch::NotFound => f.write_str("not found"),
            NoMatch::MethodNotAllowed { allowed } => {
                write!(f, "method not allowed (allowed: {})", allow_header_value(allowed))
            }
        }
    }
}

/// Join methods into an `Allow` header value
pub fn allow_header_value(methods: &[Method]) -> String {
    methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_header() {
        let no_match = NoMatch::MethodNotAllowed {
            allowed: vec![Method::GET, Method::DELETE],
        };
        assert_eq!(no_match.allow_header().as_deref(), Some("GET, DELETE"));
        assert_eq!(NoMatch::NotFound.allow_header(), None);
        assert_eq!(
            no_match.to_string(),
            "method not allowed (allowed: GET, DELETE)"
        );
    }
}
