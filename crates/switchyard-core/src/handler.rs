//! Handler trait and the cooperative chain executor

use crate::context::{ChainState, Context};
use crate::Error;
use crate::Result;
use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// A step in a handler chain: middleware or terminal handler.
///
/// A handler receives the request [`Context`] and the continuation `next`.
/// Calling `next.run(ctx)` runs the rest of the chain; returning without
/// calling it short-circuits, so later handlers never run.
#[async_trait]
pub trait Handler: Send + Sync + fmt::Debug {
    /// Process a request
    ///
    /// # Arguments
    ///
    /// * `ctx` - The request context
    /// * `next` - The rest of the chain
    ///
    /// # Returns
    ///
    /// `Ok(())` on normal return, with or without having called `next`
    async fn call(&self, ctx: &mut Context, next: Next) -> Result<()>;
}

/// Fully resolved, ordered handler chain of one route
pub type Chain = Arc<[Arc<dyn Handler>]>;

/// Represents the rest of the chain after the running handler.
///
/// `Next` is consumed by [`Next::run`], so a continuation can be taken at
/// most once.
pub struct Next {
    chain: Chain,
    index: usize,
}

impl Next {
    /// Create a continuation positioned at the start of `chain`
    pub fn new(chain: Chain) -> Self {
        Self { chain, index: 0 }
    }

    /// Number of handlers this continuation would still run
    pub fn remaining(&self) -> usize {
        self.chain.len().saturating_sub(self.index)
    }

    /// Run the next handler, or return immediately past the end of the chain
    pub async fn run(self, ctx: &mut Context) -> Result<()> {
        let Some(handler) = self.chain.get(self.index).cloned() else {
            return Ok(());
        };

        let index = self.index;
        ctx.enter(index);

        let next = Self {
            chain: self.chain,
            index: index + 1,
        };
        handler.call(ctx, next).await?;

        ctx.mark_returned();
        Ok(())
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("index", &self.index)
            .field("remaining", &self.remaining())
            .finish()
    }
}

/// How a dispatched chain ended
#[derive(Debug)]
pub enum Outcome {
    /// Every handler ran and unwound normally
    Completed,
    /// The chain stopped early without failing, e.g. a handler short-circuited
    /// or a recovery middleware trapped a failure
    Aborted,
    /// A handler failed and no recovery middleware trapped it
    Failed(Error),
}

impl Outcome {
    /// Whether the chain completed
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }

    /// Whether the chain was short-circuited
    pub fn is_aborted(&self) -> bool {
        matches!(self, Outcome::Aborted)
    }

    /// Whether the chain failed
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// Run `chain` against `ctx`.
///
/// Errors returned by handlers become [`Outcome::Failed`]. Panics are not
/// caught here and unwind out of the call; see [`dispatch_isolated`].
pub async fn dispatch(chain: &Chain, ctx: &mut Context) -> Outcome {
    if chain.is_empty() {
        ctx.finish(ChainState::Completed);
        return Outcome::Completed;
    }

    // Completed only if every handler ran and returned Ok. A recovered
    // failure leaves the failing handler uncounted.
    match Next::new(Arc::clone(chain)).run(ctx).await {
        Ok(()) if ctx.returned() == chain.len() => {
            ctx.finish(ChainState::Completed);
            Outcome::Completed
        }
        Ok(()) => {
            ctx.finish(ChainState::Aborted);
            Outcome::Aborted
        }
        Err(err) => {
            ctx.finish(ChainState::Failed);
            Outcome::Failed(err)
        }
    }
}

/// Run `chain` like [`dispatch`], turning a panic into [`Outcome::Failed`].
///
/// The panic is scoped to this request: the context is marked failed and
/// can be released back to its pool as usual.
pub async fn dispatch_isolated(chain: &Chain, ctx: &mut Context) -> Outcome {
    let result = AssertUnwindSafe(dispatch(chain, &mut *ctx))
        .catch_unwind()
        .await;

    match result {
        Ok(outcome) => outcome,
        Err(payload) => {
            ctx.finish(ChainState::Failed);
            Outcome::Failed(Error::Panic(panic_message(payload.as_ref())))
        }
    }
}

/// Extract a readable message from a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Helper macro for turning an `async fn(&mut Context, Next) -> Result<()>`
/// into a [`Handler`]
#[macro_export]
macro_rules! handler_fn {
    ($name:ident, $func:expr) => {
        #[derive(Debug)]
        struct $name;

        #[$crate::async_trait]
        impl $crate::Handler for $name {
            async fn call(
                &self,
                ctx: &mut $crate::Context,
                next: $crate::Next,
            ) -> $crate::Result<()> {
                $func(ctx, next).await
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    type Trace = Arc<Mutex<Vec<&'static str>>>;

    #[derive(Debug)]
    struct Step {
        name: &'static str,
        proceed: bool,
        trace: Trace,
    }

    #[async_trait]
    impl Handler for Step {
        async fn call(&self, ctx: &mut Context, next: Next) -> Result<()> {
            self.trace.lock().push(self.name);
            if self.proceed {
                next.run(ctx).await?;
            }
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Failing;

    #[async_trait]
    impl Handler for Failing {
        async fn call(&self, _ctx: &mut Context, _next: Next) -> Result<()> {
            Err(Error::handler("database unavailable"))
        }
    }

    #[derive(Debug)]
    struct Panicking;

    #[async_trait]
    impl Handler for Panicking {
        async fn call(&self, _ctx: &mut Context, _next: Next) -> Result<()> {
            panic!("handler exploded");
        }
    }

    fn step(name: &'static str, proceed: bool, trace: &Trace) -> Arc<dyn Handler> {
        Arc::new(Step {
            name,
            proceed,
            trace: Arc::clone(trace),
        })
    }

    #[tokio::test]
    async fn test_full_chain_completes() {
        let trace: Trace = Arc::default();
        let chain: Chain = Arc::new([
            step("m1", true, &trace),
            step("m2", true, &trace),
            step("m3", true, &trace),
            step("h", false, &trace),
        ]);

        let mut ctx = Context::new();
        let outcome = dispatch(&chain, &mut ctx).await;

        assert!(outcome.is_completed());
        assert_eq!(*trace.lock(), vec!["m1", "m2", "m3", "h"]);
        assert_eq!(ctx.cursor(), 4);
        assert_eq!(ctx.state(), ChainState::Completed);
    }

    #[tokio::test]
    async fn test_short_circuit_aborts() {
        let trace: Trace = Arc::default();
        let chain: Chain = Arc::new([
            step("m1", true, &trace),
            step("m2", false, &trace),
            step("m3", true, &trace),
            step("h", false, &trace),
        ]);

        let mut ctx = Context::new();
        let outcome = dispatch(&chain, &mut ctx).await;

        assert!(outcome.is_aborted());
        assert_eq!(*trace.lock(), vec!["m1", "m2"]);
        assert_eq!(ctx.cursor(), 2);
        assert_eq!(ctx.state(), ChainState::Aborted);
    }

    #[tokio::test]
    async fn test_terminal_calling_next_is_noop() {
        let trace: Trace = Arc::default();
        let chain: Chain = Arc::new([step("m1", true, &trace), step("h", true, &trace)]);

        let mut ctx = Context::new();
        let outcome = dispatch(&chain, &mut ctx).await;

        assert!(outcome.is_completed());
        assert_eq!(*trace.lock(), vec!["m1", "h"]);
    }

    #[tokio::test]
    async fn test_empty_chain_completes() {
        let chain: Chain = Vec::<Arc<dyn Handler>>::new().into();
        let mut ctx = Context::new();
        assert!(dispatch(&chain, &mut ctx).await.is_completed());
    }

    #[tokio::test]
    async fn test_handler_error_fails() {
        let trace: Trace = Arc::default();
        let chain: Chain = Arc::new([step("m1", true, &trace), Arc::new(Failing)]);

        let mut ctx = Context::new();
        let outcome = dispatch(&chain, &mut ctx).await;

        match outcome {
            Outcome::Failed(Error::Handler(msg)) => assert_eq!(msg, "database unavailable"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(ctx.state(), ChainState::Failed);
    }

    #[tokio::test]
    async fn test_panic_is_isolated() {
        let trace: Trace = Arc::default();
        let chain: Chain = Arc::new([step("m1", true, &trace), Arc::new(Panicking)]);

        let mut ctx = Context::new();
        let outcome = dispatch_isolated(&chain, &mut ctx).await;

        match outcome {
            Outcome::Failed(Error::Panic(msg)) => assert_eq!(msg, "handler exploded"),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(ctx.state(), ChainState::Failed);
        assert_eq!(*trace.lock(), vec!["m1"]);
    }

    async fn write_hello(ctx: &mut Context, next: Next) -> Result<()> {
        ctx.response_mut().write("hello");
        next.run(ctx).await
    }

    handler_fn!(Hello, write_hello);

    #[tokio::test]
    async fn test_handler_fn_macro() {
        let chain: Chain = Arc::new([Arc::new(Hello) as Arc<dyn Handler>]);
        let mut ctx = Context::new();

        assert!(dispatch(&chain, &mut ctx).await.is_completed());
        assert_eq!(ctx.response().body(), b"hello");
    }

    #[test]
    fn test_next_debug() {
        let chain: Chain = Arc::new([Arc::new(Hello) as Arc<dyn Handler>]);
        let next = Next::new(chain);
        assert_eq!(next.remaining(), 1);
        assert!(format!("{next:?}").contains("remaining: 1"));
    }
}
