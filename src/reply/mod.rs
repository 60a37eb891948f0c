//! # Reply Module
//!
//! Typed reply objects. Which one a handler receives is decided at compile
//! time by the route's `response` declaration:
//!
//! - a single schema ([`Single<T>`], the default being `Single<Value>`) gives
//!   a [`SingleReply<T>`]: any status, then `send` a `T`;
//! - a per-status list ([`responses!`](crate::responses)) gives a
//!   [`MultiReply`]: `status` must be called with a declared code first,
//!   which yields a [`StatusReply`] for that code's type.
//!
//! `send` consumes the reply and returns [`Sent`], the value handlers return.
//!
//! ```rust
//! use routeshape::reply::{codes, MultiReply, Sent, SingleReply};
//! use routeshape::responses;
//!
//! fn any_status(reply: SingleReply<String>) -> Sent {
//!     reply.status(202).send("accepted")
//! }
//!
//! fn per_status(reply: MultiReply<responses![200 => String, 500 => bool]>) -> Sent {
//!     reply.status(codes::OK).send("ok")
//! }
//! ```
//!
//! A value that does not match the single schema is rejected:
//!
//! ```rust,compile_fail
//! use routeshape::reply::{Sent, SingleReply};
//!
//! fn wrong_type(reply: SingleReply<String>) -> Sent {
//!     reply.status(200).send(42)
//! }
//! ```
//!
//! So is a value that does not match the selected status's schema:
//!
//! ```rust,compile_fail
//! use routeshape::reply::{codes, MultiReply, Sent};
//! use routeshape::responses;
//!
//! fn wrong_type(reply: MultiReply<responses![200 => String, 500 => bool]>) -> Sent {
//!     reply.status(codes::OK).send(true)
//! }
//! ```
//!
//! Sending before selecting a status does not compile:
//!
//! ```rust,compile_fail
//! use routeshape::reply::{MultiReply, Sent};
//! use routeshape::responses;
//!
//! fn no_status(reply: MultiReply<responses![200 => String, 500 => bool]>) -> Sent {
//!     reply.send("ok")
//! }
//! ```
//!
//! Nor does selecting a status that was never declared:
//!
//! ```rust,compile_fail
//! use routeshape::reply::{codes, MultiReply, Sent};
//! use routeshape::responses;
//!
//! fn undeclared(reply: MultiReply<responses![200 => String, 500 => bool]>) -> Sent {
//!     reply.status(codes::NOT_FOUND).send("missing")
//! }
//! ```
//!
//! And a narrowed reply cannot change its status again:
//!
//! ```rust,compile_fail
//! use routeshape::reply::{codes, MultiReply, Sent};
//! use routeshape::responses;
//!
//! fn restatus(reply: MultiReply<responses![200 => String, 500 => bool]>) -> Sent {
//!     reply.status(codes::OK).status(404).send("ok")
//! }
//! ```

mod core;
mod status;

pub(crate) use self::core::ReplyState;
pub use self::core::{MultiReply, ReplyShape, Sent, Single, SingleReply, StatusReply};
pub use status::{codes, Code, Cons, Here, Nil, ResponseList, Select, Status, There};
