use criterion::{black_box, criterion_group, criterion_main, Criterion};
use http::Method;
use switchyard::{HandlerRequest, HandlerResponse, Router};

fn ok(_req: &HandlerRequest, res: &mut HandlerResponse) {
    res.status = 200;
}

fn build_router(route_count: usize) -> Router {
    let router = Router::new();
    router.get("/", ok);
    router.get("/zoo/animals", ok);
    router.get("/zoo/animals/:id", ok);
    router.get("/zoo/animals/:id/toys/:toy", ok);
    router.get("/repos/{owner:[a-z]+}/commits/{sha:[0-9a-f]+}", ok);
    for i in 0..route_count {
        router.get(&format!("/generated/{i}/items/:id"), ok);
    }
    router
}

fn bench_matching(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("match_exact_literal", |b| {
        b.iter(|| black_box(router.match_route(&Method::GET, black_box("/zoo/animals"))))
    });

    c.bench_function("match_single_param", |b| {
        b.iter(|| black_box(router.match_route(&Method::GET, black_box("/zoo/animals/123"))))
    });

    c.bench_function("match_regex_params", |b| {
        b.iter(|| {
            black_box(router.match_route(&Method::GET, black_box("/repos/octocat/commits/deadbeef")))
        })
    });

    c.bench_function("match_miss", |b| {
        b.iter(|| black_box(router.match_route(&Method::GET, black_box("/zoo/missing/entirely"))))
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let router = build_router(100);

    c.bench_function("dispatch_single_param", |b| {
        b.iter(|| {
            let mut req = HandlerRequest::new(Method::GET, "/zoo/animals/123");
            let mut res = HandlerResponse::default();
            router.dispatch(&mut req, &mut res);
            black_box(res.status)
        })
    });
}

criterion_group!(benches, bench_matching, bench_dispatch);
criterion_main!(benches);
