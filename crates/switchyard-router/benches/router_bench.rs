// Route matching and dispatch benchmarks
//
// Run with: cargo bench -p switchyard-router --bench router_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use http::{Method, Request, StatusCode};
use http_body_util::Full;
use std::sync::Arc;
use switchyard_core::{async_trait, Bytes, Context, Handler, Next};
use switchyard_router::Router;
use tokio::runtime::Runtime;

#[derive(Debug)]
struct BenchHandler;

#[async_trait]
impl Handler for BenchHandler {
    async fn call(&self, ctx: &mut Context, _next: Next) -> switchyard_core::Result<()> {
        ctx.response_mut().text(StatusCode::OK, "benchmark response");
        Ok(())
    }
}

#[derive(Debug)]
struct PassThrough;

#[async_trait]
impl Handler for PassThrough {
    async fn call(&self, ctx: &mut Context, next: Next) -> switchyard_core::Result<()> {
        next.run(ctx).await
    }
}

fn handler() -> Arc<dyn Handler> {
    Arc::new(BenchHandler)
}

fn build_router() -> Router {
    let mut router = Router::new();
    router.use_middleware(Arc::new(PassThrough)).unwrap();

    for resource in ["users", "posts", "comments", "tags", "teams"] {
        router.get(&format!("/api/{resource}"), vec![handler()]).unwrap();
        router.post(&format!("/api/{resource}"), vec![handler()]).unwrap();
        router.get(&format!("/api/{resource}/:id"), vec![handler()]).unwrap();
        router.put(&format!("/api/{resource}/:id"), vec![handler()]).unwrap();
        router.delete(&format!("/api/{resource}/:id"), vec![handler()]).unwrap();
    }
    router.get("/api/users/active", vec![handler()]).unwrap();
    router.get("/api/users/:id/posts/:post_id", vec![handler()]).unwrap();
    router.get("/static/*filepath", vec![handler()]).unwrap();

    router.freeze();
    router
}

fn benchmark_matching(c: &mut Criterion) {
    let router = build_router();

    let mut group = c.benchmark_group("route_matching");
    group.throughput(Throughput::Elements(1));

    let paths = [
        ("static", "/api/users"),
        ("literal_over_param", "/api/users/active"),
        ("param", "/api/posts/42"),
        ("nested_params", "/api/users/42/posts/7"),
        ("catch_all", "/static/css/site/main.css"),
        ("not_found", "/nothing/here"),
    ];

    for (name, path) in paths {
        group.bench_with_input(BenchmarkId::from_parameter(name), path, |b, path| {
            b.iter(|| black_box(router.find(&Method::GET, black_box(path)).is_ok()));
        });
    }

    group.finish();
}

fn benchmark_dispatch(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let router = Arc::new(build_router());

    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    group.bench_function("handle_param_route", |b| {
        b.to_async(&rt).iter(|| {
            let router = Arc::clone(&router);
            async move {
                let req = Request::builder()
                    .method(Method::GET)
                    .uri("/api/users/42")
                    .body(Full::new(Bytes::new()))
                    .unwrap();

                black_box(router.handle(req).await)
            }
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_matching, benchmark_dispatch);
criterion_main!(benches);
