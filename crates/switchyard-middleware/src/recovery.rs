//! Recovery middleware: traps failures of the rest of the chain

use async_trait::async_trait;
use futures::FutureExt;
use http::StatusCode;
use std::panic::AssertUnwindSafe;
use switchyard_core::{panic_message, Context, Handler, Next, Result};

/// Recovery middleware
///
/// Runs the rest of the chain and turns a returned error or a panic into a
/// `500 Internal Server Error` response. The chain then ends as aborted
/// instead of failed. Only handlers after this one are covered, so it is
/// normally registered first.
#[derive(Debug, Clone, Default)]
pub struct Recovery {
    /// Include the failure message in the response body
    expose_errors: bool,
}

impl Recovery {
    /// Create a recovery middleware with a generic response body
    pub fn new() -> Self {
        Self::default()
    }

    /// Put the error or panic message in the response body
    #[must_use]
    pub fn expose_errors(mut self, expose: bool) -> Self {
        self.expose_errors = expose;
        self
    }

    fn respond(&self, ctx: &mut Context, message: &str) {
        let body = if self.expose_errors {
            message
        } else {
            "Internal Server Error"
        };
        let response = ctx.response_mut();
        response.reset();
        response.text(StatusCode::INTERNAL_SERVER_ERROR, body);
    }
}

#[async_trait]
impl Handler for Recovery {
    async fn call(&self, ctx: &mut Context, next: Next) -> Result<()> {
        let result = AssertUnwindSafe(next.run(&mut *ctx)).catch_unwind().await;

        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(
                    method = %ctx.method(),
                    path = %ctx.path(),
                    error = %e,
                    "Recovered from handler error"
                );
                self.respond(ctx, &e.to_string());
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!(
                    method = %ctx.method(),
                    path = %ctx.path(),
                    panic = %message,
                    "Recovered from handler panic"
                );
                self.respond(ctx, &message);
            }
        }

        Ok(())
    }
}
