#![allow(clippy::unwrap_used, clippy::expect_used)]

use routeshape::{InjectRequest, Instance, RouteError, RouteOptions};
use serde_json::json;

mod common;
use common::{app_with, error_message, get};

fn pet_document() -> serde_json::Value {
    json!({
        "type": "object",
        "required": ["name"],
        "properties": {
            "name": {"type": "string", "minLength": 1},
            "age": {"type": "integer", "minimum": 0}
        }
    })
}

fn paging_document() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "limit": {"type": "integer", "maximum": 50}
        }
    })
}

fn register(app: &mut Instance) {
    app.post_with(
        "/pets",
        RouteOptions::new().body_schema(pet_document()),
        |req, reply| reply.status(201).send(req.body),
    )
    .unwrap()
    .get_with(
        "/pets",
        RouteOptions::new().querystring_schema(paging_document()),
        |req, reply| reply.send(req.query),
    )
    .unwrap();
}

#[test]
fn test_body_document_enforced() {
    let mut app = Instance::default();
    register(&mut app);

    let ok = app.inject(InjectRequest::post("/pets").json(&json!({"name": "rex", "age": 2})));
    assert_eq!(ok.status, 201);
    assert_eq!(ok.body["name"], "rex");

    let bad = app.inject(InjectRequest::post("/pets").json(&json!({"name": "", "age": -1})));
    let message = error_message(&bad, 400);
    assert!(message.starts_with("body "), "{message}");
}

#[test]
fn test_querystring_document_uses_coerced_values() {
    let mut app = Instance::default();
    register(&mut app);

    assert_eq!(get(&app, "/pets?limit=10").status, 200);
    assert_eq!(get(&app, "/pets").status, 200);

    let message = error_message(&get(&app, "/pets?limit=500"), 400);
    assert!(message.starts_with("querystring "), "{message}");
}

#[test]
fn test_documents_skipped_when_validation_disabled() {
    let mut app = app_with(|o| o.validate_requests = false);
    register(&mut app);

    let resp = app.inject(InjectRequest::post("/pets").json(&json!({"age": -1})));
    assert_eq!(resp.status, 201);
    assert_eq!(get(&app, "/pets?limit=500").status, 200);
}

#[test]
fn test_invalid_document_fails_registration() {
    let mut app = Instance::default();
    let err = app
        .get_with(
            "/broken",
            RouteOptions::new().params_schema(json!({"type": 12})),
            |_req, reply| reply.send("never"),
        )
        .map(|_| ())
        .unwrap_err();
    assert!(matches!(err, RouteError::InvalidSchema { part: "params", .. }));
    assert!(app.routes().is_empty());
}

#[test]
fn test_print_routes_lists_validated_parts() {
    let mut app = Instance::default();
    register(&mut app);
    let table = app.print_routes();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("POST    /pets"), "{table}");
    assert!(lines[0].ends_with("{body}"), "{table}");
    assert!(lines[1].ends_with("{querystring}"), "{table}");
}
