use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::error;

use super::status::{Code, Cons, ResponseList, Select, Status};
use crate::dispatcher::{HandlerResponse, HeaderVec};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON: &str = "application/json; charset=utf-8";

/// Reply under construction: status and headers, no body yet.
///
/// Only the crate creates one, so a [`Sent`] can only come out of a
/// `send` call on a reply the framework handed to the handler.
#[derive(Debug)]
pub struct ReplyState {
    status: u16,
    headers: HeaderVec,
}

impl ReplyState {
    pub(crate) fn new() -> Self {
        Self {
            status: 200,
            headers: HeaderVec::new(),
        }
    }

    fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    fn has_header(&self, name: &str) -> bool {
        self.headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// Serialise the body and seal the reply.
    fn finish<T: Serialize>(mut self, value: &T) -> Sent {
        match serde_json::to_value(value) {
            Ok(body) => {
                if !self.has_header("content-type") {
                    let ct = if body.is_string() { TEXT_PLAIN } else { APPLICATION_JSON };
                    self.set_header("content-type", ct.to_string());
                }
                Sent(HandlerResponse::new(self.status, self.headers, body))
            }
            Err(err) => {
                error!(
                    status = self.status,
                    error = %err,
                    "Failed to serialize reply"
                );
                Sent(HandlerResponse::error(
                    500,
                    &format!("Failed to serialize response: {err}"),
                ))
            }
        }
    }
}

/// Proof that a handler replied.
///
/// Produced only by `send`, which consumes the reply object, so a handler
/// that returns `Sent` has sent exactly once.
#[must_use = "return the Sent value from the handler"]
#[derive(Debug)]
pub struct Sent(HandlerResponse);

impl Sent {
    #[must_use]
    pub fn status(&self) -> u16 {
        self.0.status
    }

    #[must_use]
    pub fn body(&self) -> &Value {
        &self.0.body
    }

    #[must_use]
    pub fn into_response(self) -> HandlerResponse {
        self.0
    }
}

/// Compile-time choice of reply discipline for a route's `response` member.
///
/// [`Single`] selects the single-schema discipline ([`SingleReply`]); a
/// per-status list built with [`responses!`](crate::responses) selects the
/// per-status discipline ([`MultiReply`]). An empty list has no impl.
pub trait ReplyShape: 'static {
    type Reply;

    #[doc(hidden)]
    fn reply(state: ReplyState) -> Self::Reply;

    /// Status codes of a per-status declaration; empty for a single schema
    fn declared_codes() -> Vec<u16>;
}

/// A single response schema, valid for any status code.
pub struct Single<T>(PhantomData<fn() -> T>);

impl<T: Serialize + 'static> ReplyShape for Single<T> {
    type Reply = SingleReply<T>;

    fn reply(state: ReplyState) -> Self::Reply {
        SingleReply {
            state,
            _body: PhantomData,
        }
    }

    fn declared_codes() -> Vec<u16> {
        Vec::new()
    }
}

impl<const N: u16, T: 'static, Tail: ResponseList + 'static> ReplyShape
    for Cons<Status<N, T>, Tail>
{
    type Reply = MultiReply<Self>;

    fn reply(state: ReplyState) -> Self::Reply {
        MultiReply {
            state,
            _list: PhantomData,
        }
    }

    fn declared_codes() -> Vec<u16> {
        let mut out = Vec::new();
        Self::collect_codes(&mut out);
        out
    }
}

/// Reply for a route with a single response schema `T`.
///
/// Any status code may be set, any number of times; `send` accepts only
/// values convertible into `T` and consumes the reply.
#[derive(Debug)]
pub struct SingleReply<T> {
    state: ReplyState,
    _body: PhantomData<fn(T)>,
}

impl<T: Serialize> SingleReply<T> {
    /// Set the status code
    #[must_use]
    pub fn status(mut self, code: u16) -> Self {
        self.state.status = code;
        self
    }

    /// The status code that `send` will use
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.state.status
    }

    /// Set a header, replacing any previous value (names compare case-insensitively)
    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.state.set_header(name, value.into());
        self
    }

    /// Override the content type picked by `send`
    #[must_use]
    pub fn content_type(self, value: impl Into<String>) -> Self {
        self.header("content-type", value)
    }

    /// Send the response body.
    pub fn send(self, value: impl Into<T>) -> Sent {
        self.state.finish(&value.into())
    }
}

/// Reply for a route with per-status response schemas.
///
/// Exposes no `send`: a status from the declaration list must be selected
/// first, which narrows the reply to that status's schema.
#[derive(Debug)]
pub struct MultiReply<L> {
    state: ReplyState,
    _list: PhantomData<fn() -> L>,
}

impl<L> MultiReply<L> {
    /// Set a header, replacing any previous value
    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.state.set_header(name, value.into());
        self
    }

    /// Select a declared status code, narrowing the body type to its schema.
    ///
    /// `I` is inferred; selecting a code missing from the declaration does
    /// not compile.
    pub fn status<const N: u16, I>(mut self, _code: Code<N>) -> StatusReply<<L as Select<N, I>>::Body>
    where
        L: Select<N, I>,
    {
        self.state.status = N;
        StatusReply {
            state: self.state,
            _body: PhantomData,
        }
    }
}

/// A per-status reply after status selection: the status is fixed and only
/// the selected schema may be sent.
#[derive(Debug)]
pub struct StatusReply<T> {
    state: ReplyState,
    _body: PhantomData<fn(T)>,
}

impl<T: Serialize> StatusReply<T> {
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.state.status
    }

    /// Set a header, replacing any previous value
    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.state.set_header(name, value.into());
        self
    }

    #[must_use]
    pub fn content_type(self, value: impl Into<String>) -> Self {
        self.header("content-type", value)
    }

    /// Send the body declared for the selected status.
    pub fn send(self, value: impl Into<T>) -> Sent {
        self.state.finish(&value.into())
    }
}
