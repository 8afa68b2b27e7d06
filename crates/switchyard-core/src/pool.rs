//! Request context pool

use crate::context::Context;
use parking_lot::Mutex;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Default number of idle contexts kept for reuse
pub const DEFAULT_MAX_IDLE: usize = 1024;

/// Pool of reusable request contexts.
///
/// The pool grows on demand. Contexts released while `max_idle` contexts are
/// already idle are dropped.
pub struct ContextPool {
    free: Mutex<Vec<Context>>,
    max_idle: usize,
    created: AtomicUsize,
}

impl ContextPool {
    /// Create a pool with the default idle limit
    pub fn new() -> Self {
        Self::with_max_idle(DEFAULT_MAX_IDLE)
    }

    /// Create a pool keeping at most `max_idle` idle contexts
    pub fn with_max_idle(max_idle: usize) -> Self {
        Self {
            free: Mutex::new(Vec::new()),
            max_idle,
            created: AtomicUsize::new(0),
        }
    }

    /// Check out a context with no params bound and a zeroed cursor
    pub fn acquire(&self) -> PooledContext<'_> {
        let reused = self.free.lock().pop();
        let ctx = match reused {
            Some(mut ctx) => {
                ctx.reset();
                ctx
            }
            None => {
                let created = self.created.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::trace!(created, "Allocated request context");
                Context::new()
            }
        };

        PooledContext {
            ctx: Some(ctx),
            pool: self,
        }
    }

    /// Return a context to the pool. Equivalent to dropping the guard.
    pub fn release(&self, ctx: PooledContext<'_>) {
        drop(ctx);
    }

    fn check_in(&self, mut ctx: Context) {
        // Idle contexts must not keep the last request's headers or body
        ctx.reset();

        let mut free = self.free.lock();
        if free.len() < self.max_idle {
            free.push(ctx);
        } else {
            tracing::trace!(max_idle = self.max_idle, "Context pool full, dropping context");
        }
    }

    /// Number of idle contexts ready for reuse
    pub fn idle(&self) -> usize {
        self.free.lock().len()
    }

    /// Number of contexts allocated over the pool's lifetime
    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    /// Idle limit
    pub fn max_idle(&self) -> usize {
        self.max_idle
    }
}

impl Default for ContextPool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContextPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextPool")
            .field("idle", &self.idle())
            .field("created", &self.created())
            .field("max_idle", &self.max_idle)
            .finish()
    }
}

/// A context checked out of a [`ContextPool`].
///
/// The context goes back to the pool when the guard is dropped, which
/// also happens while unwinding from a panic. Holding the guard for the
/// whole dispatch ties release to the end of the chain.
pub struct PooledContext<'a> {
    ctx: Option<Context>,
    pool: &'a ContextPool,
}

impl Deref for PooledContext<'_> {
    type Target = Context;

    fn deref(&self) -> &Context {
        // Only `Drop` takes the context out.
        self.ctx.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl DerefMut for PooledContext<'_> {
    fn deref_mut(&mut self) -> &mut Context {
        self.ctx.as_mut().unwrap_or_else(|| unreachable!())
    }
}

impl Drop for PooledContext<'_> {
    fn drop(&mut self) {
        if let Some(ctx) = self.ctx.take() {
            self.pool.check_in(ctx);
        }
    }
}

impl fmt::Debug for PooledContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledContext")
            .field("ctx", &self.ctx)
            .finish()
    }
}
