//! # routeshape
//!
//! **routeshape** derives statically-checked handler signatures from route
//! schema declarations. A route declares the value type of its body, headers,
//! querystring and params, and either one response type or one per status
//! code; the handler's request and reply types follow from that declaration
//! at compile time.
//!
//! ## Overview
//!
//! - Path parameters come from the route template. `/users/:name/age/:id`
//!   yields a record with exactly `name` and `id`, either at compile time
//!   with [`route_params`] or at registration time via [`path::PathTemplate`].
//! - Each request part resolves to its declared type, or to an
//!   unconstrained `serde_json::Value` when not declared ([`schema`]).
//! - A single response schema gives a reply that sends that type at any
//!   status; a per-status declaration gives a reply that must select a
//!   declared status before sending, after which only that status's type is
//!   accepted ([`reply`]).
//! - Routing, dispatch and validation are delegated: a radix-tree
//!   [`router`], a [`dispatcher`] of type-erased handlers, `serde` for
//!   decoding and `jsonschema` for optional JSON Schema documents.
//!
//! ## Architecture
//!
//! - **[`path`]** - template parsing and the params record
//! - **[`schema`]** - schema declarations, decoding, JSON Schema documents
//! - **[`reply`]** - single-schema and per-status reply objects
//! - **[`typed`]** - typed request and handler erasure
//! - **[`instance`]** - the registration surface: verbs, routes, plugins, `inject`
//! - **[`router`]** / **[`dispatcher`]** / **[`middleware`]** - the host layer
//! - **[`config`]** / **[`logging`]** - options and tracing setup
//!
//! ## Quick Start
//!
//! ```rust
//! use routeshape::reply::codes;
//! use routeshape::schema::Schema;
//! use routeshape::{responses, route_params, InjectRequest, Instance, RouteOptions};
//! use serde::Deserialize;
//!
//! #[route_params("/users/:name/age/:id")]
//! struct UserParams;
//!
//! #[derive(Deserialize)]
//! struct Greeting {
//!     excited: bool,
//! }
//!
//! let mut app = Instance::default();
//! app.get_with(
//!     "/users/:name/age/:id",
//!     RouteOptions::new().schema(
//!         Schema::new()
//!             .params::<UserParams>()
//!             .querystring::<Greeting>()
//!             .responses::<responses![200 => String, 400 => String]>(),
//!     ),
//!     |req, reply| {
//!         if req.params.id.parse::<u32>().is_err() {
//!             return reply.status(codes::BAD_REQUEST).send("age must be a number");
//!         }
//!         let mark = if req.query.excited { "!" } else { "." };
//!         reply
//!             .status(codes::OK)
//!             .send(format!("{} is {}{mark}", req.params.name, req.params.id))
//!     },
//! )
//! .unwrap();
//!
//! let resp = app.inject(InjectRequest::get("/users/ada/age/36?excited=true"));
//! assert_eq!(resp.status, 200);
//! assert_eq!(resp.body, "ada is 36!");
//! ```

extern crate self as routeshape;

pub mod config;
pub mod dispatcher;
mod error;
pub mod ids;
pub mod instance;
pub mod logging;
pub mod middleware;
pub mod path;
pub mod reply;
pub mod router;
pub mod schema;
pub mod typed;

pub use config::InstanceOptions;
pub use error::RouteError;
pub use instance::{InjectRequest, Instance, PluginOptions, RouteDefinition, RouteOptions};
pub use routeshape_macros::route_params;

#[doc(hidden)]
pub mod __private {
    pub use serde;
}
