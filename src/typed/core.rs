use std::fmt;
use std::sync::Arc;

use http::Method;
use tracing::{debug, error};

use crate::dispatcher::{HandlerFn, HandlerRequest, HandlerResponse};
use crate::ids::RequestId;
use crate::reply::{ReplyShape, ReplyState, Sent};
use crate::schema::{
    decode_body, decode_strings, headers_object, params_object, query_object, CompiledSchemas,
    DecodeError, RouteSchema,
};

/// Reply object handed to handlers of a route with schema `S`
pub type Reply<S> = <<S as RouteSchema>::Response as ReplyShape>::Reply;

/// Request as seen by a typed handler: every part decoded into the type the
/// route's schema declares.
pub struct Request<S: RouteSchema> {
    pub id: RequestId,
    pub method: Method,
    /// Request path as received, without the query string
    pub url: String,
    pub handler_name: String,
    pub params: S::Params,
    pub query: S::Querystring,
    pub headers: S::Headers,
    pub body: S::Body,
}

impl<S> fmt::Debug for Request<S>
where
    S: RouteSchema,
    S::Params: fmt::Debug,
    S::Querystring: fmt::Debug,
    S::Headers: fmt::Debug,
    S::Body: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("id", &self.id)
            .field("method", &self.method)
            .field("url", &self.url)
            .field("handler_name", &self.handler_name)
            .field("params", &self.params)
            .field("query", &self.query)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .finish()
    }
}

impl<S: RouteSchema> Request<S> {
    /// Decode a raw request into the typed shape of `S`.
    ///
    /// # Errors
    ///
    /// Returns the first request part that does not fit its declared type,
    /// checked in the order params, querystring, headers, body.
    pub fn from_handler(req: HandlerRequest) -> Result<Self, DecodeError> {
        let params = decode_strings("params", params_object(&req.path_params))?;
        let query = decode_strings("querystring", query_object(&req.query_params))?;
        let headers = decode_strings("headers", headers_object(&req.headers))?;
        let body = decode_body(req.body)?;
        Ok(Request {
            id: req.request_id,
            method: req.method,
            url: req.path,
            handler_name: req.handler_name,
            params,
            query,
            headers,
            body,
        })
    }
}

/// What a typed handler may return.
///
/// A handler either returns the [`Sent`] token directly or a `Result` whose
/// error becomes a 500 reply.
pub trait Outcome {
    fn into_response(self) -> HandlerResponse;
}

impl Outcome for Sent {
    fn into_response(self) -> HandlerResponse {
        Sent::into_response(self)
    }
}

impl<E> Outcome for Result<Sent, E>
where
    E: Into<anyhow::Error>,
{
    fn into_response(self) -> HandlerResponse {
        match self {
            Ok(sent) => sent.into_response(),
            Err(err) => {
                let err: anyhow::Error = err.into();
                error!(error = %err, "Handler returned an error");
                HandlerResponse::error(500, &err.to_string())
            }
        }
    }
}

/// Run the optional JSON Schema documents against the raw request parts.
fn check_documents(schemas: &CompiledSchemas, req: &HandlerRequest) -> Result<(), String> {
    schemas.check_params(&params_object(&req.path_params))?;
    schemas.check_querystring(&query_object(&req.query_params))?;
    schemas.check_headers(&headers_object(&req.headers))?;
    if let Some(body) = &req.body {
        schemas.check_body(body)?;
    }
    Ok(())
}

/// Erase a typed handler into a dispatcher [`HandlerFn`].
///
/// The returned function checks JSON Schema documents (when present and
/// `validate` is set), decodes the request into `Request<S>`, builds the
/// reply object for `S::Response` and calls the handler. Check and decode
/// failures produce a 400 reply without calling the handler.
pub(crate) fn erase<S, F, O>(handler: F, schemas: CompiledSchemas, validate: bool) -> HandlerFn
where
    S: RouteSchema,
    F: Fn(Request<S>, Reply<S>) -> O + Send + Sync + 'static,
    O: Outcome,
{
    let check = validate && !schemas.is_empty();
    Arc::new(move |req: HandlerRequest| -> HandlerResponse {
        if check {
            if let Err(message) = check_documents(&schemas, &req) {
                return HandlerResponse::error(400, &message);
            }
        }
        let handler_name = req.handler_name.clone();
        let typed = match Request::<S>::from_handler(req) {
            Ok(typed) => typed,
            Err(err) => {
                debug!(
                    handler_name = %handler_name,
                    part = err.part,
                    error = %err.message,
                    "Request did not match the route schema"
                );
                return HandlerResponse::error(400, &err.to_string());
            }
        };
        let reply = <S::Response as ReplyShape>::reply(ReplyState::new());
        handler(typed, reply).into_response()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathParams;
    use crate::reply::{codes, Single};
    use crate::responses;
    use crate::router::ParamVec;
    use crate::schema::{Schema, SchemaDocs};
    use serde::Deserialize;
    use serde_json::{json, Value};

    #[derive(Debug, Deserialize)]
    struct Paging {
        limit: u32,
    }

    fn raw(
        path_params: &[(&str, &str)],
        query: &[(&str, &str)],
        body: Option<Value>,
    ) -> HandlerRequest {
        let mut params = ParamVec::new();
        for (k, v) in path_params {
            params.push((Arc::from(*k), v.to_string()));
        }
        HandlerRequest {
            request_id: RequestId::new(),
            method: Method::GET,
            path: "/test".to_string(),
            handler_name: "test".to_string(),
            path_params: params,
            query_params: query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            headers: Default::default(),
            body,
        }
    }

    #[test]
    fn test_unconstrained_request() {
        let req =
            Request::<Schema>::from_handler(raw(&[("id", "7")], &[("a", "1")], None)).unwrap();
        assert_eq!(req.params.get("id"), Some("7"));
        assert_eq!(req.query, json!({"a": "1"}));
        assert!(req.body.is_null());
    }

    #[test]
    fn test_typed_querystring_decoded() {
        type S = Schema<Value, Value, Paging>;
        let req = Request::<S>::from_handler(raw(&[], &[("limit", "25")], None)).unwrap();
        assert_eq!(req.query.limit, 25);

        let err = Request::<S>::from_handler(raw(&[], &[], None)).unwrap_err();
        assert_eq!(err.part, "querystring");
    }

    #[test]
    fn test_erased_handler_replies() {
        type S = Schema<Value, Value, Paging, PathParams, Single<String>>;
        let handler = erase::<S, _, _>(
            |req, reply| reply.status(201).send(format!("limit={}", req.query.limit)),
            CompiledSchemas::default(),
            true,
        );
        let resp = handler(raw(&[], &[("limit", "3")], None));
        assert_eq!(resp.status, 201);
        assert_eq!(resp.body, json!("limit=3"));

        let resp = handler(raw(&[], &[("limit", "x")], None));
        assert_eq!(resp.status, 400);
        assert_eq!(resp.body["error"], "Bad Request");
    }

    #[test]
    fn test_erased_per_status_handler() {
        type S = Schema<Value, Value, Value, PathParams, responses![200 => String, 500 => bool]>;
        let handler = erase::<S, _, _>(
            |_req, reply| reply.status(codes::INTERNAL_SERVER_ERROR).send(false),
            CompiledSchemas::default(),
            true,
        );
        let resp = handler(raw(&[], &[], None));
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body, json!(false));
    }

    #[test]
    fn test_handler_error_is_500() {
        let handler = erase::<Schema, _, _>(
            |_req, _reply| -> anyhow::Result<Sent> { Err(anyhow::anyhow!("database unavailable")) },
            CompiledSchemas::default(),
            true,
        );
        let resp = handler(raw(&[], &[], None));
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body["message"], "database unavailable");
    }

    #[test]
    fn test_documents_checked_only_when_enabled() {
        let docs = SchemaDocs {
            body: Some(json!({"type": "object", "required": ["name"]})),
            ..SchemaDocs::default()
        };
        let strict = erase::<Schema, _, _>(
            |_req, reply| reply.send(json!("ok")),
            CompiledSchemas::compile(&docs).unwrap(),
            true,
        );
        let lax = erase::<Schema, _, _>(
            |_req, reply| reply.send(json!("ok")),
            CompiledSchemas::compile(&docs).unwrap(),
            false,
        );
        assert_eq!(strict(raw(&[], &[], Some(json!({})))).status, 400);
        assert_eq!(strict(raw(&[], &[], Some(json!({"name": "x"})))).status, 200);
        assert_eq!(lax(raw(&[], &[], Some(json!({})))).status, 200);
    }
}
