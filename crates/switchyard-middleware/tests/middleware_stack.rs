//! Middleware stacks mounted on a router

use http::{Method, Request, StatusCode};
use http_body_util::Full;
use std::sync::Arc;
use std::time::Duration;
use switchyard_core::{async_trait, Body, Bytes, Context, Error, Handler, Next, Outcome, Result};
use switchyard_middleware::{BearerAuthConfig, MiddlewareBuilder};
use switchyard_router::Router;

#[derive(Debug)]
struct Hello;

#[async_trait]
impl Handler for Hello {
    async fn call(&self, ctx: &mut Context, _next: Next) -> Result<()> {
        let name = ctx.param("name").unwrap_or("world").to_string();
        ctx.response_mut()
            .text(StatusCode::OK, format!("hello {name}"));
        Ok(())
    }
}

#[derive(Debug)]
struct Broken;

#[async_trait]
impl Handler for Broken {
    async fn call(&self, _ctx: &mut Context, _next: Next) -> Result<()> {
        Err(Error::handler("storage offline"))
    }
}

#[derive(Debug)]
struct Sleepy;

#[async_trait]
impl Handler for Sleepy {
    async fn call(&self, ctx: &mut Context, _next: Next) -> Result<()> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        ctx.response_mut().text(StatusCode::OK, "late");
        Ok(())
    }
}

fn handler<H: Handler + 'static>(handler: H) -> Vec<Arc<dyn Handler>> {
    vec![Arc::new(handler)]
}

fn request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Full::new(Bytes::new())).unwrap()
}

fn router() -> Router {
    let mut router = Router::new();
    router
        .use_all(
            MiddlewareBuilder::new()
                .with_recovery()
                .with_request_id()
                .with_logging()
                .build(),
        )
        .unwrap();
    router.get("/hello/:name", handler(Hello)).unwrap();
    router.get("/broken", handler(Broken)).unwrap();

    {
        let mut slow = router.group("/slow").unwrap();
        slow.use_all(
            MiddlewareBuilder::new()
                .with_timeout_duration(Duration::from_millis(100))
                .build(),
        )
        .unwrap();
        slow.get("/", handler(Sleepy)).unwrap();
    }

    {
        let mut admin = router.group("/admin").unwrap();
        admin
            .use_all(
                MiddlewareBuilder::new()
                    .with_bearer_auth(BearerAuthConfig {
                        tokens: vec!["letmein".to_string()],
                        ..Default::default()
                    })
                    .build(),
            )
            .unwrap();
        admin.get("/hello", handler(Hello)).unwrap();
    }

    router
}

#[tokio::test]
async fn test_full_stack_completes() {
    let router = router();
    let handled = router.handle(request("/hello/ada", None)).await;

    assert!(matches!(handled.outcome, Outcome::Completed));
    assert_eq!(handled.response.status(), StatusCode::OK);
    assert!(handled.response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_recovered_error_is_aborted() {
    let router = router();
    let handled = router.handle(request("/broken", None)).await;

    assert!(matches!(handled.outcome, Outcome::Aborted));
    assert_eq!(handled.response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(handled.response.headers().contains_key("x-request-id"));
}

#[tokio::test(start_paused = true)]
async fn test_group_timeout() {
    let router = router();
    let handled = router.handle(request("/slow", None)).await;

    assert!(matches!(handled.outcome, Outcome::Aborted));
    assert_eq!(handled.response.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_group_auth() {
    let router = router();

    let handled = router.handle(request("/admin/hello", None)).await;
    assert_eq!(handled.response.status(), StatusCode::UNAUTHORIZED);

    let handled = router.handle(request("/admin/hello", Some("letmein"))).await;
    assert_eq!(handled.response.status(), StatusCode::OK);

    // Auth is scoped to the group
    let handled = router.handle(request("/hello/bob", None)).await;
    assert_eq!(handled.response.status(), StatusCode::OK);
}
