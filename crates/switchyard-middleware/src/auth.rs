//! Bearer token authentication middleware
//!
//! Checks the `Authorization: Bearer <token>` header against a fixed set of
//! accepted tokens. Requests without a valid token are answered with
//! `401 Unauthorized` and the rest of the chain never runs.
//!
//! Tokens are compared in constant time with respect to their contents;
//! only the token length can leak through timing.

use async_trait::async_trait;
use http::header::{self, HeaderValue};
use http::StatusCode;
use std::fmt;
use switchyard_core::{Context, Handler, Next, Result};

/// Bearer authentication configuration
#[derive(Clone, Default)]
pub struct BearerAuthConfig {
    /// Accepted tokens
    pub tokens: Vec<String>,

    /// Paths that don't require authentication; a trailing `*` matches a prefix
    pub skip_paths: Vec<String>,

    /// Realm reported in the `WWW-Authenticate` challenge
    pub realm: Option<String>,
}

impl fmt::Debug for BearerAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuthConfig")
            .field("tokens", &self.tokens.len())
            .field("skip_paths", &self.skip_paths)
            .field("realm", &self.realm)
            .finish()
    }
}

/// Bearer token authentication middleware
#[derive(Clone)]
pub struct BearerAuth {
    tokens: Vec<String>,
    skip_paths: Vec<String>,
    challenge: HeaderValue,
}

impl BearerAuth {
    /// Accept any of `tokens`
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_config(BearerAuthConfig {
            tokens: tokens.into_iter().map(Into::into).collect(),
            ..Default::default()
        })
    }

    /// Create from configuration
    pub fn with_config(config: BearerAuthConfig) -> Self {
        let challenge = config
            .realm
            .as_deref()
            .and_then(|realm| HeaderValue::from_str(&format!("Bearer realm=\"{realm}\"")).ok())
            .unwrap_or_else(|| HeaderValue::from_static("Bearer"));

        Self {
            tokens: config.tokens,
            skip_paths: config.skip_paths,
            challenge,
        }
    }

    /// Extract token from the request
    fn extract_token<'c>(&self, ctx: &'c Context) -> Option<&'c str> {
        ctx.headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
    }

    /// Check if path should skip authentication
    fn should_skip(&self, path: &str) -> bool {
        self.skip_paths.iter().any(|skip_path| {
            match skip_path.strip_suffix('*') {
                Some(prefix) => path.starts_with(prefix),
                None => path == skip_path,
            }
        })
    }

    /// Checks every configured token without stopping at the first hit
    fn accepts(&self, presented: &str) -> bool {
        self.tokens.iter().fold(false, |found, token| {
            found | constant_time_eq(token.as_bytes(), presented.as_bytes())
        })
    }

    fn unauthorized(&self, ctx: &mut Context, message: &str) {
        let response = ctx.response_mut();
        response.text(StatusCode::UNAUTHORIZED, message);
        response.header(header::WWW_AUTHENTICATE, self.challenge.clone());
    }
}

impl fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuth")
            .field("tokens", &self.tokens.len())
            .field("skip_paths", &self.skip_paths)
            .finish()
    }
}

/// Byte comparison whose running time depends only on the lengths
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

#[async_trait]
impl Handler for BearerAuth {
    async fn call(&self, ctx: &mut Context, next: Next) -> Result<()> {
        if self.should_skip(ctx.path()) {
            return next.run(ctx).await;
        }

        let verdict = match self.extract_token(ctx) {
            None => Err("Missing bearer token"),
            Some(token) if self.accepts(token) => Ok(()),
            Some(_) => Err("Invalid bearer token"),
        };

        match verdict {
            Ok(()) => next.run(ctx).await,
            Err(message) => {
                tracing::debug!(path = %ctx.path(), reason = message, "Authentication failed");
                self.unauthorized(ctx, message);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use switchyard_core::{dispatch, Chain, Request};

    #[derive(Debug)]
    struct Protected;

    #[async_trait]
    impl Handler for Protected {
        async fn call(&self, ctx: &mut Context, _next: Next) -> Result<()> {
            ctx.response_mut().text(StatusCode::OK, "secret data");
            Ok(())
        }
    }

    fn chain(auth: BearerAuth) -> Chain {
        Arc::new([Arc::new(auth) as Arc<dyn Handler>, Arc::new(Protected)])
    }

    fn context(path: &str, authorization: Option<&str>) -> Context {
        let mut builder = Request::builder().uri(path);
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        Context::with_request(builder.body(Default::default()).unwrap())
    }

    #[tokio::test]
    async fn test_valid_token() {
        let mut ctx = context("/api/data", Some("Bearer token-a"));
        let outcome = dispatch(&chain(BearerAuth::new(["token-a", "token-b"])), &mut ctx).await;

        assert!(outcome.is_completed());
        assert_eq!(ctx.response().status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_token() {
        let mut ctx = context("/api/data", None);
        let outcome = dispatch(&chain(BearerAuth::new(["token-a"])), &mut ctx).await;

        assert!(outcome.is_aborted());
        assert_eq!(ctx.response().status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ctx.response().headers()[header::WWW_AUTHENTICATE], "Bearer");
        assert_eq!(ctx.response().body(), b"Missing bearer token");
    }

    #[tokio::test]
    async fn test_invalid_token() {
        let auth = BearerAuth::with_config(BearerAuthConfig {
            tokens: vec!["token-a".to_string()],
            realm: Some("switchyard".to_string()),
            ..Default::default()
        });
        let mut ctx = context("/api/data", Some("Bearer wrong"));
        let outcome = dispatch(&chain(auth), &mut ctx).await;

        assert!(outcome.is_aborted());
        assert_eq!(
            ctx.response().headers()[header::WWW_AUTHENTICATE],
            "Bearer realm=\"switchyard\""
        );
    }

    #[test]
    fn test_token_comparison() {
        assert!(constant_time_eq(b"token-a", b"token-a"));
        assert!(!constant_time_eq(b"token-a", b"token-b"));
        assert!(!constant_time_eq(b"token-a", b"token-a2"));
        assert!(!constant_time_eq(b"", b"x"));

        let auth = BearerAuth::new(["first", "second", "third"]);
        assert!(auth.accepts("first"));
        assert!(auth.accepts("third"));
        assert!(!auth.accepts("fourth"));
        assert!(!auth.accepts(""));
    }

    #[tokio::test]
    async fn test_skip_paths() {
        let auth = BearerAuth::with_config(BearerAuthConfig {
            tokens: vec!["token-a".to_string()],
            skip_paths: vec!["/health".to_string(), "/public/*".to_string()],
            ..Default::default()
        });
        assert!(auth.should_skip("/health"));
        assert!(auth.should_skip("/public/logo.png"));
        assert!(!auth.should_skip("/healthz"));

        let mut ctx = context("/public/index.html", None);
        assert!(dispatch(&chain(auth), &mut ctx).await.is_completed());
    }
}
