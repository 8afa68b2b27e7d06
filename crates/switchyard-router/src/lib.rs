//! # Switchyard Router
//!
//! Trie-based request router with support for:
//! - Path parameter extraction (`/users/:id`)
//! - Catch-all matching (`/static/*filepath`)
//! - Method-based routing with `405 Method Not Allowed` detection
//! - Nested route groups with shared prefixes and middleware
//! - Pooled per-request contexts
//!
//! Routes are registered once at startup. The first call to
//! [`Router::handle`] freezes the router; after that the trie and groups
//! are read without locking.
//!
//! ## Example
//!
//! ```ignore
//! let mut router = Router::new();
//! router.use_middleware(Arc::new(RequestLogger::new()))?;
//! router.get("/users/:id", vec![show_user])?;
//!
//! let handled = router.handle(request).await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod fallback;
pub mod group;
pub mod matcher;
pub mod pattern;
pub mod route;
pub mod trie;

pub use fallback::{MethodNotAllowed, NotFound};
pub use group::{GroupHandle, GroupId};
pub use matcher::{NoMatch, RouteMatch};
pub use pattern::{Pattern, Segment};
pub use route::Route;
pub use trie::RouteTrie;

use fallback::Fallbacks;
use group::Groups;
use http::{Method, Request, Response};
use pattern::join_paths;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use switchyard_core::pool::DEFAULT_MAX_IDLE;
use switchyard_core::{
    dispatch_isolated, Body, Chain, ContextPool, Handler, Outcome, Params, RegistrationError,
    Result,
};

/// Router configuration
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Maximum number of idle request contexts kept for reuse
    pub pool_max_idle: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            pool_max_idle: DEFAULT_MAX_IDLE,
        }
    }
}

/// Result of dispatching one request
#[derive(Debug)]
pub struct Handled {
    /// How the handler chain ended
    pub outcome: Outcome,

    /// Response produced by the chain, or a generic error response
    pub response: Response<Body>,
}

/// Request router: registration API and dispatch entry point
pub struct Router {
    trie: RouteTrie,
    groups: Groups,
    pool: ContextPool,
    frozen: AtomicBool,
    not_found: Arc<dyn Handler>,
    method_not_allowed: Arc<dyn Handler>,
    fallbacks: OnceLock<Fallbacks>,
}

impl Router {
    /// Create a new router
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    /// Create a router with custom configuration
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            trie: RouteTrie::new(),
            groups: Groups::new(),
            pool: ContextPool::with_max_idle(config.pool_max_idle),
            frozen: AtomicBool::new(false),
            not_found: Arc::new(NotFound),
            method_not_allowed: Arc::new(MethodNotAllowed),
            fallbacks: OnceLock::new(),
        }
    }

    /// Append global middleware, run before every route registered afterwards
    pub fn use_middleware(&mut self, handler: Arc<dyn Handler>) -> Result<&mut Self> {
        self.add_middleware(GroupId::ROOT, handler)?;
        Ok(self)
    }

    /// Append several global middleware, in order
    pub fn use_all(&mut self, handlers: Vec<Arc<dyn Handler>>) -> Result<&mut Self> {
        for handler in handlers {
            self.add_middleware(GroupId::ROOT, handler)?;
        }
        Ok(self)
    }

    /// Register a route
    pub fn route(
        &mut self,
        method: Method,
        pattern: &str,
        handlers: Vec<Arc<dyn Handler>>,
    ) -> Result<&mut Self> {
        self.register(GroupId::ROOT, method, pattern, handlers)?;
        Ok(self)
    }

    /// Register a GET route
    pub fn get(&mut self, pattern: &str, handlers: Vec<Arc<dyn Handler>>) -> Result<&mut Self> {
        self.route(Method::GET, pattern, handlers)
    }

    /// Register a POST route
    pub fn post(&mut self, pattern: &str, handlers: Vec<Arc<dyn Handler>>) -> Result<&mut Self> {
        self.route(Method::POST, pattern, handlers)
    }

    /// Register a PUT route
    pub fn put(&mut self, pattern: &str, handlers: Vec<Arc<dyn Handler>>) -> Result<&mut Self> {
        self.route(Method::PUT, pattern, handlers)
    }

    /// Register a PATCH route
    pub fn patch(&mut self, pattern: &str, handlers: Vec<Arc<dyn Handler>>) -> Result<&mut Self> {
        self.route(Method::PATCH, pattern, handlers)
    }

    /// Register a DELETE route
    pub fn delete(&mut self, pattern: &str, handlers: Vec<Arc<dyn Handler>>) -> Result<&mut Self> {
        self.route(Method::DELETE, pattern, handlers)
    }

    /// Create a top-level group
    pub fn group(&mut self, prefix: &str) -> Result<GroupHandle<'_>> {
        let id = self.create_group(GroupId::ROOT, prefix)?;
        Ok(GroupHandle::new(self, id))
    }

    /// Replace the handler for requests that match no route
    pub fn not_found(&mut self, handler: Arc<dyn Handler>) -> Result<&mut Self> {
        self.ensure_open(|| "not-found handler".to_string())?;
        self.not_found = handler;
        Ok(self)
    }

    /// Replace the handler for paths that exist only for other methods
    pub fn method_not_allowed(&mut self, handler: Arc<dyn Handler>) -> Result<&mut Self> {
        self.ensure_open(|| "method-not-allowed handler".to_string())?;
        self.method_not_allowed = handler;
        Ok(self)
    }

    /// Stop accepting registrations. Idempotent.
    pub fn freeze(&self) {
        // Plain load on the per-request path; only the first call writes
        if self.is_frozen() {
            return;
        }
        if !self.frozen.swap(true, Ordering::AcqRel) {
            tracing::debug!(
                routes = self.trie.len(),
                groups = self.groups.len(),
                "Router frozen"
            );
        }
        self.fallbacks();
    }

    /// Whether registration is closed
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Match a method and path without dispatching
    pub fn find(&self, method: &Method, path: &str) -> std::result::Result<RouteMatch, NoMatch> {
        self.trie.match_path(method, path)
    }

    /// All registered routes, in trie order
    pub fn routes(&self) -> Vec<Arc<Route>> {
        self.trie.get_all_routes()
    }

    /// Number of registered routes
    pub fn route_count(&self) -> usize {
        self.trie.len()
    }

    /// The request context pool
    pub fn pool(&self) -> &ContextPool {
        &self.pool
    }

    /// Dispatch a request.
    ///
    /// Freezes the router on first use. The context is taken from the pool
    /// and returned to it once the chain has fully unwound. A chain that
    /// fails (error or panic) without being recovered yields a generic
    /// error response and [`Outcome::Failed`].
    pub async fn handle(&self, request: Request<Body>) -> Handled {
        self.freeze();
        let fallbacks = self.fallbacks();

        let matched = self.trie.match_path(request.method(), request.uri().path());
        let mut ctx = self.pool.acquire();

        let chain = match matched {
            Ok(RouteMatch { route, params }) => {
                ctx.bind(request, params);
                ctx.set_route_pattern(route.path_arc());
                Arc::clone(route.chain())
            }
            Err(NoMatch::NotFound) => {
                tracing::debug!(
                    method = %request.method(),
                    path = %request.uri().path(),
                    "No route matched"
                );
                ctx.bind(request, Params::new());
                Arc::clone(&fallbacks.not_found)
            }
            Err(NoMatch::MethodNotAllowed { allowed }) => {
                tracing::debug!(
                    method = %request.method(),
                    path = %request.uri().path(),
                    allowed = ?allowed,
                    "Method not allowed"
                );
                ctx.bind(request, Params::new());
                ctx.set_allowed_methods(allowed);
                Arc::clone(&fallbacks.method_not_allowed)
            }
        };

        let outcome = dispatch_isolated(&chain, &mut ctx).await;

        if let Outcome::Failed(err) = &outcome {
            tracing::error!(
                method = %ctx.method(),
                path = %ctx.path(),
                route = ctx.route_pattern().unwrap_or("-"),
                error = %err,
                "Request failed"
            );
            let status = err.to_status_code();
            let response = ctx.response_mut();
            response.reset();
            response.text(status, status.canonical_reason().unwrap_or("Error"));
        }

        let response = ctx.response_mut().take();
        self.pool.release(ctx);

        Handled { outcome, response }
    }

    fn fallbacks(&self) -> &Fallbacks {
        self.fallbacks.get_or_init(|| {
            Fallbacks::new(
                &self.groups.effective_middleware(GroupId::ROOT),
                &self.not_found,
                &self.method_not_allowed,
            )
        })
    }

    fn ensure_open(&self, target: impl FnOnce() -> String) -> Result<()> {
        if self.is_frozen() {
            return Err(RegistrationError::Frozen { target: target() }.into());
        }
        Ok(())
    }

    pub(crate) fn add_middleware(&mut self, group: GroupId, handler: Arc<dyn Handler>) -> Result<()> {
        self.ensure_open(|| {
            format!("middleware on '{}'", self.groups.effective_prefix(group))
        })?;
        tracing::debug!(group = group.index(), middleware = ?handler, "Middleware added");
        self.groups.push_middleware(group, handler);
        Ok(())
    }

    pub(crate) fn create_group(&mut self, parent: GroupId, prefix: &str) -> Result<GroupId> {
        self.ensure_open(|| format!("group '{prefix}'"))?;
        let id = self.groups.create(parent, prefix)?;
        tracing::debug!(
            group = id.index(),
            prefix = %self.groups.effective_prefix(id),
            "Group created"
        );
        Ok(id)
    }

    /// Compile the full pattern, resolve the chain and insert the route
    pub(crate) fn register(
        &mut self,
        group: GroupId,
        method: Method,
        pattern: &str,
        handlers: Vec<Arc<dyn Handler>>,
    ) -> Result<()> {
        let full = join_paths(&self.groups.effective_prefix(group), pattern);
        self.ensure_open(|| format!("{method} {full}"))?;

        let pattern = Pattern::parse(pattern)
            .and_then(|_| Pattern::parse(&full))?;

        if handlers.is_empty() {
            return Err(RegistrationError::EmptyHandlerChain {
                method,
                pattern: pattern.to_string(),
            }
            .into());
        }

        let chain: Chain = self
            .groups
            .effective_middleware(group)
            .into_iter()
            .chain(handlers)
            .collect();

        let route = Route::new(method, pattern, chain);
        tracing::debug!(
            method = %route.method(),
            path = %route.path(),
            handlers = route.chain().len(),
            "Route registered"
        );

        self.trie.insert(route)?;
        Ok(())
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.trie.len())
            .field("groups", &self.groups.len())
            .field("frozen", &self.is_frozen())
            .field("pool", &self.pool)
            .finish()
    }
}

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{GroupHandle, Handled, NoMatch, Route, RouteMatch, Router, RouterConfig};
    pub use switchyard_core::prelude::*;
}
