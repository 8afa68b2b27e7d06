//! Error types for Switchyard

/// Result type alias using [`Error`]
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A malformed route pattern, detected while compiling it
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    /// The same parameter name appears twice in one pattern
    #[error("duplicate parameter name '{name}' in pattern '{pattern}'")]
    DuplicateParamName {
        /// Offending pattern
        pattern: String,
        /// Repeated parameter name
        name: String,
    },

    /// A catch-all segment is followed by further segments
    #[error("catch-all segment '*{name}' must be the last segment of '{pattern}'")]
    CatchAllNotTerminal {
        /// Offending pattern
        pattern: String,
        /// Catch-all parameter name
        name: String,
    },

    /// A `:` or `*` segment without a name
    #[error("parameter without a name in pattern '{pattern}'")]
    EmptyParamName {
        /// Offending pattern
        pattern: String,
    },

    /// A non-empty pattern that does not start with `/`
    #[error("pattern '{pattern}' must start with '/'")]
    MissingLeadingSlash {
        /// Offending pattern
        pattern: String,
    },
}

/// A structural conflict detected while registering a route
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// The method already has a route at this pattern
    #[error("route already registered: {method} {pattern}")]
    DuplicateRoute {
        /// HTTP method
        method: http::Method,
        /// Full route pattern
        pattern: String,
    },

    /// A different parameter name is already registered at the same position
    #[error("parameter ':{new}' in '{pattern}' conflicts with existing ':{existing}' at the same position")]
    ConflictingParamName {
        /// Full route pattern being registered
        pattern: String,
        /// Name already present in the trie
        existing: String,
        /// Name requested by the new pattern
        new: String,
    },

    /// A route registered without any handler of its own
    #[error("route {method} {pattern} has no handler")]
    EmptyHandlerChain {
        /// HTTP method
        method: http::Method,
        /// Full route pattern
        pattern: String,
    },

    /// Registration attempted after the router started serving
    #[error("router is frozen, cannot register {target}")]
    Frozen {
        /// What was being registered, e.g. `GET /users` or `middleware on /api`
        target: String,
    },
}

/// Main error type for Switchyard
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed route pattern
    #[error("invalid pattern: {0}")]
    Pattern(#[from] PatternError),

    /// Route registration conflict
    #[error("registration failed: {0}")]
    Registration(#[from] RegistrationError),

    /// A handler terminated with an error
    #[error("handler error: {0}")]
    Handler(String),

    /// A handler panicked
    #[error("handler panicked: {0}")]
    Panic(String),

    /// The request could not be read, e.g. a truncated body
    #[error("invalid HTTP request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Convert error to HTTP status code
    pub fn to_status_code(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Create a handler error
    pub fn handler(message: impl Into<String>) -> Self {
        Error::Handler(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            Error::InvalidRequest("bad header".to_string()).to_status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::Panic("boom".to_string()).to_status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_pattern_error_converts() {
        let err: Error = PatternError::EmptyParamName {
            pattern: "/users/:".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Pattern(_)));
        assert!(err.to_string().contains("/users/:"));
    }

    #[test]
    fn test_registration_error_message() {
        let err = RegistrationError::ConflictingParamName {
            pattern: "/a/:y".to_string(),
            existing: "x".to_string(),
            new: "y".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains(":x"));
        assert!(msg.contains(":y"));
    }
}
