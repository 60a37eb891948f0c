use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use http::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use tracing::{debug, error, info, warn};

use crate::ids::RequestId;
use crate::middleware::Middleware;
use crate::router::ParamVec;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Header storage; names are lower-cased on the request side
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Query string pairs in arrival order; repeated keys appear repeatedly
pub type QueryVec = SmallVec<[(String, String); 8]>;

/// Untyped request handed to a registered handler
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    pub request_id: RequestId,
    pub method: Method,
    /// Request path without the query string
    pub path: String,
    /// Dispatcher key of the handler processing this request
    pub handler_name: String,
    pub path_params: ParamVec,
    pub query_params: QueryVec,
    pub headers: HeaderVec,
    /// Parsed JSON body, if one was sent
    pub body: Option<Value>,
}

impl HandlerRequest {
    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response produced by a handler, or by the host on its behalf
#[derive(Debug, Clone, Serialize)]
pub struct HandlerResponse {
    pub status: u16,
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    pub body: Value,
}

impl HandlerResponse {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// JSON response with a `content-type` header
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json; charset=utf-8".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Error body in the `{statusCode, error, message}` shape
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        let reason = StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Error");
        Self::json(
            status,
            serde_json::json!({
                "statusCode": status,
                "error": reason,
                "message": message,
            }),
        )
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}

/// Type-erased handler as stored by the dispatcher
pub type HandlerFn = Arc<dyn Fn(HandlerRequest) -> HandlerResponse + Send + Sync>;

/// Registry of handlers by name, plus the middleware chain around them.
#[derive(Clone, Default)]
pub struct Dispatcher {
    handlers: HashMap<String, HandlerFn>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name`. An existing handler with the same
    /// name is replaced.
    pub fn register_handler(&mut self, name: &str, handler: HandlerFn) {
        if self.handlers.insert(name.to_string(), handler).is_some() {
            warn!(handler_name = %name, "Replaced existing handler");
        } else {
            debug!(
                handler_name = %name,
                total_handlers = self.handlers.len(),
                "Handler registered"
            );
        }
    }

    #[must_use]
    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Middleware runs in the order it was added
    pub fn add_middleware(&mut self, mw: Arc<dyn Middleware>) {
        self.middlewares.push(mw);
    }

    /// Run the request through middleware and its handler.
    ///
    /// Returns `None` when no handler is registered under
    /// `req.handler_name`. A panicking handler or `before` hook yields a 500
    /// response; a panicking `after` hook is logged and the response kept.
    #[must_use]
    pub fn dispatch(&self, req: HandlerRequest) -> Option<HandlerResponse> {
        let handler = self.handlers.get(&req.handler_name)?;
        let start = Instant::now();

        for mw in &self.middlewares {
            let outcome = match catch_unwind(AssertUnwindSafe(|| mw.before(&req))) {
                Ok(outcome) => outcome,
                Err(panic) => {
                    let panic_message = panic_message(panic.as_ref());
                    error!(
                        request_id = %req.request_id,
                        handler_name = %req.handler_name,
                        panic_message = %panic_message,
                        "Middleware before hook panicked"
                    );
                    Some(HandlerResponse::error(
                        500,
                        &format!("Middleware panicked: {panic_message}"),
                    ))
                }
            };
            if let Some(mut resp) = outcome {
                debug!(
                    request_id = %req.request_id,
                    handler_name = %req.handler_name,
                    status = resp.status,
                    "Request short-circuited by middleware"
                );
                self.run_after(&req, &mut resp, start);
                return Some(resp);
            }
        }

        // Middleware `after` hooks need the request once the handler owns it
        let for_after = (!self.middlewares.is_empty()).then(|| req.clone());
        let request_id = req.request_id;
        let handler_name = req.handler_name.clone();

        debug!(
            request_id = %request_id,
            handler_name = %handler_name,
            path_params = ?req.path_params,
            "Handler execution start"
        );

        let mut resp = match catch_unwind(AssertUnwindSafe(|| handler(req))) {
            Ok(resp) => resp,
            Err(panic) => {
                let panic_message = panic_message(panic.as_ref());
                error!(
                    request_id = %request_id,
                    handler_name = %handler_name,
                    panic_message = %panic_message,
                    "Handler panicked"
                );
                HandlerResponse::error(500, &format!("Handler panicked: {panic_message}"))
            }
        };

        if let Some(req) = for_after {
            self.run_after(&req, &mut resp, start);
        }

        info!(
            request_id = %request_id,
            handler_name = %handler_name,
            status = resp.status,
            latency_us = start.elapsed().as_micros() as u64,
            "Handler execution complete"
        );
        Some(resp)
    }

    fn run_after(&self, req: &HandlerRequest, resp: &mut HandlerResponse, start: Instant) {
        let latency = start.elapsed();
        for mw in &self.middlewares {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| mw.after(req, resp, latency))) {
                error!(
                    request_id = %req.request_id,
                    handler_name = %req.handler_name,
                    panic_message = %panic_message(panic.as_ref()),
                    "Middleware after hook panicked"
                );
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn request(handler: &str) -> HandlerRequest {
        HandlerRequest {
            request_id: RequestId::new(),
            method: Method::GET,
            path: "/x".to_string(),
            handler_name: handler.to_string(),
            path_params: ParamVec::new(),
            query_params: QueryVec::new(),
            headers: HeaderVec::new(),
            body: None,
        }
    }

    #[test]
    fn test_missing_handler_is_none() {
        let dispatcher = Dispatcher::new();
        assert!(dispatcher.dispatch(request("nope")).is_none());
    }

    #[test]
    fn test_panic_becomes_500() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register_handler(
            "boom",
            Arc::new(|_req: HandlerRequest| -> HandlerResponse { panic!("kaboom") }),
        );
        let resp = dispatcher.dispatch(request("boom")).unwrap();
        assert_eq!(resp.status, 500);
        assert_eq!(resp.body["error"], "Internal Server Error");
        assert!(resp.body["message"].as_str().unwrap().contains("kaboom"));
    }

    struct Deny;
    impl Middleware for Deny {
        fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
            Some(HandlerResponse::error(401, "nope"))
        }
    }

    struct Count(AtomicUsize);
    impl Middleware for Count {
        fn after(&self, _req: &HandlerRequest, res: &mut HandlerResponse, _latency: Duration) {
            self.0.fetch_add(1, Ordering::SeqCst);
            res.set_header("x-counted", "yes".to_string());
        }
    }

    #[test]
    fn test_middleware_short_circuit_and_after() {
        let called = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&called);
        let mut dispatcher = Dispatcher::new();
        dispatcher.register_handler(
            "h",
            Arc::new(move |_req: HandlerRequest| {
                seen.fetch_add(1, Ordering::SeqCst);
                HandlerResponse::json(200, Value::Null)
            }),
        );
        let counter = Arc::new(Count(AtomicUsize::new(0)));
        dispatcher.add_middleware(Arc::clone(&counter) as Arc<dyn Middleware>);

        let resp = dispatcher.dispatch(request("h")).unwrap();
        assert_eq!(resp.get_header("X-Counted"), Some("yes"));
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);

        dispatcher.add_middleware(Arc::new(Deny));
        let resp = dispatcher.dispatch(request("h")).unwrap();
        assert_eq!(resp.status, 401);
        assert_eq!(called.load(Ordering::SeqCst), 1);
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }

    struct PanicBefore;
    impl Middleware for PanicBefore {
        fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
            panic!("before exploded")
        }
    }

    struct PanicAfter;
    impl Middleware for PanicAfter {
        fn after(&self, _req: &HandlerRequest, _res: &mut HandlerResponse, _latency: Duration) {
            panic!("after exploded")
        }
    }

    #[test]
    fn test_panicking_hooks_contained() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.register_handler(
            "h",
            Arc::new(|_req: HandlerRequest| HandlerResponse::json(200, Value::from("done"))),
        );
        dispatcher.add_middleware(Arc::new(PanicAfter));
        let counter = Arc::new(Count(AtomicUsize::new(0)));
        dispatcher.add_middleware(Arc::clone(&counter) as Arc<dyn Middleware>);

        let resp = dispatcher.dispatch(request("h")).unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body, "done");
        // hooks after the panicking one still run
        assert_eq!(resp.get_header("x-counted"), Some("yes"));

        dispatcher.add_middleware(Arc::new(PanicBefore));
        let resp = dispatcher.dispatch(request("h")).unwrap();
        assert_eq!(resp.status, 500);
        assert!(resp.body["message"]
            .as_str()
            .unwrap()
            .contains("before exploded"));
        assert_eq!(counter.0.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_error_shape() {
        let resp = HandlerResponse::error(404, "Route GET:/x not found");
        assert_eq!(resp.body["statusCode"], 404);
        assert_eq!(resp.body["error"], "Not Found");
        assert_eq!(resp.get_header("content-type"), Some("application/json; charset=utf-8"));
    }
}
