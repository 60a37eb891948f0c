//! # Typed Module
//!
//! The typed side of a route: [`Request<S>`] carries every request part
//! decoded into the type declared by the route's schema `S`, and
//! [`Reply<S>`] names the reply object the schema's response member selects.
//!
//! Handlers are plain closures or functions:
//!
//! ```rust
//! use routeshape::reply::{Sent, SingleReply};
//! use routeshape::schema::Schema;
//! use routeshape::typed::Request;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Paging {
//!     limit: u32,
//! }
//!
//! type ListUsers = Schema<serde_json::Value, serde_json::Value, Paging>;
//!
//! fn list_users(req: Request<ListUsers>, reply: SingleReply<serde_json::Value>) -> Sent {
//!     reply.send(serde_json::json!({ "limit": req.query.limit }))
//! }
//! ```
//!
//! A handler returns [`Sent`](crate::reply::Sent), or a `Result<Sent, E>`
//! whose error becomes a 500 reply (see [`Outcome`]). Requests that do not
//! decode into the declared types are answered with 400 before the handler
//! runs.

mod core;

pub(crate) use self::core::erase;
pub use self::core::{Outcome, Reply, Request};
