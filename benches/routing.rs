use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;
use routeshape::schema::Schema;
use routeshape::{InjectRequest, Instance, RouteOptions};
use serde::Deserialize;

#[derive(Deserialize)]
struct Paging {
    #[serde(default)]
    limit: u32,
}

fn zoo() -> Instance {
    let mut app = Instance::default();
    let plain = [
        (Method::GET, "/"),
        (Method::GET, "/zoo/animals"),
        (Method::POST, "/zoo/animals"),
        (Method::GET, "/zoo/animals/:id"),
        (Method::PUT, "/zoo/animals/:id"),
        (Method::PATCH, "/zoo/animals/:id"),
        (Method::DELETE, "/zoo/animals/:id"),
        (Method::GET, "/zoo/animals/:id/toys/:toy_id"),
        (Method::GET, "/zoo/:category/animals/:id/habitats/:habitat_id/sections/:section_id"),
        (Method::POST, "/inventory/:warehouse_id/feeds/:feed_id/items/:item_id/batches/:batch_id"),
        (Method::GET, "/complex/:a/:b/:c/:d/:e/:f/:g/:h/:i"),
    ];
    for (method, path) in plain {
        let handler = |req: routeshape::typed::Request<Schema>, reply: routeshape::typed::Reply<Schema>| {
            reply.send(req.params.len())
        };
        let result = match method {
            Method::POST => app.post(path, handler),
            Method::PUT => app.put(path, handler),
            Method::PATCH => app.patch(path, handler),
            Method::DELETE => app.delete(path, handler),
            _ => app.get(path, handler),
        };
        result.expect("bench route should register");
    }
    app.get_with(
        "/zoo/search",
        RouteOptions::new().schema(Schema::new().querystring::<Paging>()),
        |req, reply| reply.send(req.query.limit),
    )
    .expect("bench route should register");
    app
}

fn bench_route_match(c: &mut Criterion) {
    let app = zoo();
    let test_paths = [
        (Method::GET, "/zoo/animals/123"),
        (Method::GET, "/zoo/animals/123/toys/456"),
        (Method::GET, "/zoo/cats/animals/123/habitats/88/sections/5"),
        (Method::POST, "/inventory/1/feeds/2/items/3/batches/4"),
        (Method::GET, "/complex/1/2/3/4/5/6/7/8/9"),
    ];
    c.bench_function("route_match", |b| {
        b.iter(|| {
            for (method, path) in &test_paths {
                black_box(app.has_route(method, path));
            }
        });
    });
}

fn bench_inject(c: &mut Criterion) {
    let app = zoo();
    c.bench_function("inject_plain", |b| {
        b.iter(|| black_box(app.inject(InjectRequest::get("/zoo/animals/123/toys/456"))));
    });
    c.bench_function("inject_typed_query", |b| {
        b.iter(|| black_box(app.inject(InjectRequest::get("/zoo/search?limit=25"))));
    });
}

criterion_group!(benches, bench_route_match, bench_inject);
criterion_main!(benches);
