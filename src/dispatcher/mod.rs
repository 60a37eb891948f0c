//! # Dispatcher Module
//!
//! Handler registry and invocation for routed requests.
//!
//! Handlers are stored type-erased, keyed by the route's handler name. The
//! typed layer wraps each typed handler in a closure that decodes the
//! [`HandlerRequest`], runs the handler and encodes its reply, so the
//! dispatcher only ever sees untyped requests and responses.
//!
//! ## Error Handling
//!
//! - Missing handlers yield `None`; the caller turns that into a 500.
//! - Handler panics are caught and become 500 responses.
//! - Middleware can short-circuit a request before its handler runs.

mod core;

pub use self::core::{
    Dispatcher, HandlerFn, HandlerRequest, HandlerResponse, HeaderVec, QueryVec,
    MAX_INLINE_HEADERS,
};
