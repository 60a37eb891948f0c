//! # Schema Module
//!
//! Route schema declarations. A route's schema names the value type of each
//! request part (body, headers, querystring, params) and its response
//! discipline; undeclared parts stay unconstrained. The handler's request and
//! reply types are computed from it at compile time.
//!
//! Request parts are decoded with serde at dispatch time (see
//! [`DecodeError`]). Routes may additionally attach JSON Schema documents
//! ([`SchemaDocs`]), compiled with `jsonschema` when the route is registered.

mod core;
mod decode;
mod validate;

pub use self::core::{RouteSchema, Schema};
pub(crate) use decode::{decode_body, decode_strings, headers_object, params_object, query_object};
pub use decode::DecodeError;
pub(crate) use validate::CompiledSchemas;
pub use validate::SchemaDocs;
