#![allow(clippy::unwrap_used, clippy::expect_used)]

use routeshape::path::{ParamsShape, PathParams, PathTemplate};
use routeshape::schema::Schema;
use routeshape::{route_params, InjectRequest, Instance, RouteError, RouteOptions};

mod common;
use common::get;

#[route_params("/users/:name/age/:id")]
struct UserParams;

#[route_params("/add")]
struct NoParams;

#[route_params("/things/:type")]
struct KeywordParams;

#[test]
fn test_template_yields_exactly_declared_names() {
    let t = PathTemplate::parse("/users/:name/age/:id").unwrap();
    assert_eq!(t.param_names(), vec!["name", "id"]);

    let mut app = Instance::default();
    app.get("/users/:name/age/:id", |req, reply| {
        let params: &PathParams = &req.params;
        reply.send(serde_json::to_value(params).unwrap_or_default())
    })
    .unwrap();

    let resp = get(&app, "/users/ada/age/36");
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, serde_json::json!({"name": "ada", "id": "36"}));
}

#[test]
fn test_static_template_has_no_params() {
    let t = PathTemplate::parse("/add").unwrap();
    assert!(t.param_names().is_empty());
    assert_eq!(NoParams::declared_names(), Some(&[][..]));

    let mut app = Instance::default();
    app.get("/add", |req, reply| reply.send(req.params.len())).unwrap();
    assert_eq!(get(&app, "/add").body, 0);
}

#[test]
fn test_parsing_is_idempotent() {
    let a = PathTemplate::parse("/users/:name/age/:id").unwrap();
    let b = PathTemplate::parse("/users/:name/age/:id").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_string().parse::<PathTemplate>().unwrap(), b);
}

#[test]
fn test_macro_generates_record() {
    assert_eq!(UserParams::declared_names(), Some(&["name", "id"][..]));
    assert_eq!(UserParams::declared_template(), Some("/users/:name/age/:id"));

    let decoded: UserParams =
        serde_json::from_value(serde_json::json!({"id": "36", "name": "ada"})).unwrap();
    assert_eq!(
        decoded,
        UserParams {
            name: "ada".to_string(),
            id: "36".to_string(),
        }
    );
}

#[test]
fn test_macro_keyword_param() {
    let decoded: KeywordParams =
        serde_json::from_value(serde_json::json!({"type": "bolt"})).unwrap();
    assert_eq!(decoded.r#type, "bolt");
}

#[test]
fn test_typed_params_reach_handler() {
    let mut app = Instance::default();
    app.get_with(
        "/users/:name/age/:id",
        RouteOptions::new().schema(Schema::new().params::<UserParams>()),
        |req, reply| reply.send(format!("{}:{}", req.params.name, req.params.id)),
    )
    .unwrap();

    let resp = get(&app, "/users/ada/age/36");
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, "ada:36");
}

#[test]
fn test_declared_names_order_insensitive() {
    let mut app = Instance::default();
    let result = app.get_with(
        "/people/:id/called/:name",
        RouteOptions::new().schema(Schema::new().params::<UserParams>()),
        |req, reply| reply.send(req.params.name),
    );
    assert!(result.is_ok());
}

#[test]
fn test_params_mismatch_rejected() {
    let mut app = Instance::default();
    let err = app
        .get_with(
            "/users/:name",
            RouteOptions::new().schema(Schema::new().params::<UserParams>()),
            |req, reply| reply.send(req.params.name),
        )
        .map(|_| ())
        .unwrap_err();
    match err {
        RouteError::ParamsMismatch {
            template_params,
            declared_params,
            ..
        } => {
            assert_eq!(template_params, vec!["name".to_string()]);
            assert_eq!(declared_params, vec!["name".to_string(), "id".to_string()]);
        }
        other => panic!("expected ParamsMismatch, got {other:?}"),
    }
    assert!(app.routes().is_empty());
}

#[test]
fn test_invalid_templates_rejected() {
    let mut app = Instance::default();
    for bad in ["users", "/users/:", "/a//b", "/:id/:id", "/x/:9"] {
        let result = app.get(bad, |_req, reply| reply.send("x")).map(|_| ());
        assert!(result.is_err(), "{bad} should be rejected");
    }
    assert!(app.routes().is_empty());
}

#[test]
fn test_default_params_record() {
    let mut app = Instance::default();
    app.get("/files/:dir/:name", |req, reply| {
        let params: &PathParams = &req.params;
        reply.send(serde_json::json!({
            "dir": params.get("dir"),
            "name": params.get("name"),
        }))
    })
    .unwrap();

    let resp = app.inject(InjectRequest::get("/files/docs/read%20me.txt"));
    assert_eq!(resp.body["dir"], "docs");
    assert_eq!(resp.body["name"], "read me.txt");
}

#[test]
fn test_numeric_params_coerced_for_typed_record() {
    #[derive(serde::Deserialize)]
    struct ById {
        id: u64,
    }
    impl ParamsShape for ById {}

    let mut app = Instance::default();
    app.get_with(
        "/orders/:id",
        RouteOptions::new().schema(Schema::new().params::<ById>()),
        |req, reply| reply.send(req.params.id * 2),
    )
    .unwrap();

    assert_eq!(get(&app, "/orders/21").body, 42);
    let resp = get(&app, "/orders/abc");
    let message = common::error_message(&resp, 400);
    assert!(message.starts_with("params"));
}

#[test]
fn test_full_unsigned_param_range() {
    #[derive(serde::Deserialize)]
    struct Big {
        id: u64,
    }
    impl ParamsShape for Big {}

    let mut app = Instance::default();
    app.get_with(
        "/o/:id",
        RouteOptions::new().schema(Schema::new().params::<Big>()),
        |req, reply| reply.send(req.params.id),
    )
    .unwrap();

    let resp = get(&app, "/o/18446744073709551615");
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, u64::MAX);
}
