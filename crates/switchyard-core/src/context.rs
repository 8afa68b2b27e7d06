//! Request context and bound path parameters

use crate::response::{Body, ResponseWriter};
use bytes::Bytes;
use http::{HeaderMap, Method, Request};
use http_body_util::Full;
use std::sync::Arc;

/// A path parameter bound during a match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name from the pattern
    pub name: String,
    /// Value taken from the request path
    pub value: String,
}

/// Ordered set of path parameters, in pattern order, names unique
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<Param>,
}

impl Params {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a parameter by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// Append a binding. The caller guarantees the name is not bound yet.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push(Param {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Drop bindings past `len`
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// Iterate over bindings in pattern order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|p| (p.name.as_str(), p.value.as_str()))
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no parameter is bound
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every binding, keeping the allocation
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Per-request execution state of a handler chain.
///
/// Transitions only move forward:
/// `Pending -> Running(0) -> .. -> Running(n-1) -> Completed | Aborted | Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// Not dispatched yet
    Pending,
    /// Handler at this index is the innermost one running
    Running(usize),
    /// Every handler ran and unwound normally
    Completed,
    /// A handler returned without calling its continuation
    Aborted,
    /// A handler failed and nothing recovered it
    Failed,
}

/// Context attached to each request while its chain runs.
///
/// Contexts are pooled by [`ContextPool`](crate::ContextPool); everything in
/// here is cleared by [`Context::reset`] before reuse.
#[derive(Debug)]
pub struct Context {
    request: Request<Body>,
    params: Params,
    response: ResponseWriter,
    cursor: usize,
    state: ChainState,
    returned: usize,
    route_pattern: Option<Arc<str>>,
    allowed_methods: Vec<Method>,
}

impl Context {
    /// Create a fresh context with an empty placeholder request
    pub fn new() -> Self {
        Self {
            request: empty_request(),
            params: Params::new(),
            response: ResponseWriter::new(),
            cursor: 0,
            state: ChainState::Pending,
            returned: 0,
            route_pattern: None,
            allowed_methods: Vec::new(),
        }
    }

    /// Create a context around a request, for use outside the router
    pub fn with_request(request: Request<Body>) -> Self {
        let mut ctx = Self::new();
        ctx.request = request;
        ctx
    }

    /// Clear params, response, cursor and request so the context can be reused.
    ///
    /// The request and the response buffer are dropped, not just emptied, so
    /// an idle context holds no request data.
    pub fn reset(&mut self) {
        self.request = empty_request();
        self.params.clear();
        self.response = ResponseWriter::new();
        self.cursor = 0;
        self.state = ChainState::Pending;
        self.returned = 0;
        self.route_pattern = None;
        self.allowed_methods.clear();
    }

    /// Attach the request and the parameters bound by the matcher
    pub fn bind(&mut self, request: Request<Body>, params: Params) {
        self.request = request;
        self.params = params;
    }

    /// Get a path parameter
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// All bound path parameters
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Request method
    pub fn method(&self) -> &Method {
        self.request.method()
    }

    /// Request path, without query string
    pub fn path(&self) -> &str {
        self.request.uri().path()
    }

    /// Request headers
    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    /// The request being handled
    pub fn request(&self) -> &Request<Body> {
        &self.request
    }

    /// Mutable access to the request, e.g. to insert headers for later handlers
    pub fn request_mut(&mut self) -> &mut Request<Body> {
        &mut self.request
    }

    /// Response sink
    pub fn response(&self) -> &ResponseWriter {
        &self.response
    }

    /// Mutable response sink
    pub fn response_mut(&mut self) -> &mut ResponseWriter {
        &mut self.response
    }

    /// Number of handlers entered so far
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Current chain state
    pub fn state(&self) -> ChainState {
        self.state
    }

    /// Pattern of the matched route, `None` for fallback dispatches
    pub fn route_pattern(&self) -> Option<&str> {
        self.route_pattern.as_deref()
    }

    /// Record the matched route pattern
    pub fn set_route_pattern(&mut self, pattern: Arc<str>) {
        self.route_pattern = Some(pattern);
    }

    /// Methods registered at the matched path, set on method-not-allowed dispatches
    pub fn allowed_methods(&self) -> &[Method] {
        &self.allowed_methods
    }

    /// Record the methods allowed at the requested path
    pub fn set_allowed_methods(&mut self, methods: Vec<Method>) {
        self.allowed_methods = methods;
    }

    pub(crate) fn enter(&mut self, index: usize) {
        self.cursor = index + 1;
        self.state = ChainState::Running(index);
    }

    /// Count a handler that returned `Ok`
    pub(crate) fn mark_returned(&mut self) {
        self.returned += 1;
    }

    pub(crate) fn returned(&self) -> usize {
        self.returned
    }

    pub(crate) fn finish(&mut self, state: ChainState) {
        self.state = state;
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

fn empty_request() -> Request<Body> {
    Request::new(Full::new(Bytes::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_in_pattern_order() {
        let mut params = Params::new();
        params.push("user_id", "42");
        params.push("post_id", "7");

        assert_eq!(params.get("user_id"), Some("42"));
        assert_eq!(params.get("missing"), None);
        let names: Vec<&str> = params.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["user_id", "post_id"]);

        params.truncate(1);
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("post_id"), None);
    }

    #[test]
    fn test_context_bind_and_reset() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/users/42?verbose=1")
            .body(Full::new(Bytes::from("{}")))
            .unwrap();

        let mut params = Params::new();
        params.push("id", "42");

        let mut ctx = Context::new();
        ctx.bind(request, params);
        ctx.enter(0);
        ctx.response_mut().write("hello");

        assert_eq!(ctx.method(), Method::POST);
        assert_eq!(ctx.path(), "/users/42");
        assert_eq!(ctx.param("id"), Some("42"));
        assert_eq!(ctx.cursor(), 1);
        assert_eq!(ctx.state(), ChainState::Running(0));

        ctx.reset();
        assert!(ctx.params().is_empty());
        assert_eq!(ctx.cursor(), 0);
        assert_eq!(ctx.state(), ChainState::Pending);
        assert!(!ctx.response().is_written());
        assert_eq!(ctx.path(), "/");
    }
}
