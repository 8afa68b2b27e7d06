//! Default handlers for requests that match no route

use crate::matcher::allow_header_value;
use async_trait::async_trait;
use http::header::{HeaderValue, ALLOW};
use http::StatusCode;
use std::sync::Arc;
use switchyard_core::{Chain, Context, Handler, Next, Result};

/// Responds `404 Not Found`
#[derive(Debug, Default, Clone, Copy)]
pub struct NotFound;

#[async_trait]
impl Handler for NotFound {
    async fn call(&self, ctx: &mut Context, _next: Next) -> Result<()> {
        ctx.response_mut().text(StatusCode::NOT_FOUND, "Not Found");
        Ok(())
    }
}

/// Responds `405 Method Not Allowed` with an `Allow` header
#[derive(Debug, Default, Clone, Copy)]
pub struct MethodNotAllowed;

#[async_trait]
impl Handler for MethodNotAllowed {
    async fn call(&self, ctx: &mut Context, _next: Next) -> Result<()> {
        let allow = allow_header_value(ctx.allowed_methods());
        let response = ctx.response_mut();
        response.text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
        if let Ok(value) = HeaderValue::from_str(&allow) {
            response.header(ALLOW, value);
        }
        Ok(())
    }
}

/// Chains run for unmatched requests: global middleware, then the handler
#[derive(Debug)]
pub(crate) struct Fallbacks {
    pub(crate) not_found: Chain,
    pub(crate) method_not_allowed: Chain,
}

impl Fallbacks {
    pub(crate) fn new(
        global: &[Arc<dyn Handler>],
        not_found: &Arc<dyn Handler>,
        method_not_allowed: &Arc<dyn Handler>,
    ) -> Self {
        let compose = |terminal: &Arc<dyn Handler>| -> Chain {
            global
                .iter()
                .cloned()
                .chain(std::iter::once(Arc::clone(terminal)))
                .collect()
        };

        Self {
            not_found: compose(not_found),
            method_not_allowed: compose(method_not_allowed),
        }
    }
}
