//! Routing benchmarks.
//!
//! Run with: `cargo bench -p alchemy-router`

use alchemy_router::{RouteDefinition, Router};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use http::Method;

fn build_router(num_routes: usize) -> Router {
    let mut router = Router::new();

    for i in 0..num_routes / 3 {
        router
            .add(RouteDefinition::new(format!("Resource{i}")).path(format!("/api/v1/resource{i}")))
            .expect("static route");
    }

    for i in 0..num_routes / 3 {
        router
            .add(
                RouteDefinition::new(format!("ResourceById{i}"))
                    .path(format!("/api/v1/resource{i}/{{id}}"))
                    .prefixed_path("nl", format!("/api/v1/bron{i}/{{id}}")),
            )
            .expect("param route");
    }

    for i in 0..num_routes / 3 {
        router
            .add(
                RouteDefinition::new(format!("OrgResource{i}"))
                    .path(format!("/api/v1/org/{{orgId}}/resource{i}/{{id}}"))
                    .handler("Org#show"),
            )
            .expect("nested route");
    }

    router
}

fn bench_static_match(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("static_match", |b| {
        b.iter(|| black_box(router.match_route(&Method::GET, "/api/v1/resource20", None)));
    });
}

fn bench_param_match(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("param_match", |b| {
        b.iter(|| black_box(router.match_route(&Method::GET, "/api/v1/resource25/12345", None)));
    });
}

fn bench_prefixed_url(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("prefixed_url", |b| {
        b.iter(|| black_box(router.resolve_url(&Method::GET, "/nl/api/v1/bron10/12345?page=2")));
    });
}

fn bench_miss(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("miss", |b| {
        b.iter(|| black_box(router.resolve(&Method::GET, "/api/v1/nonexistent/path", None)));
    });
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");

    for num_routes in [10, 50, 100, 500] {
        let router = build_router(num_routes);

        group.bench_with_input(
            BenchmarkId::new("param_match", num_routes),
            &num_routes,
            |b, &n| {
                let path = format!("/api/v1/resource{}/12345", n / 6);
                b.iter(|| black_box(router.match_route(&Method::GET, &path, None)));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_static_match,
    bench_param_match,
    bench_prefixed_url,
    bench_miss,
    bench_scaling
);
criterion_main!(benches);
