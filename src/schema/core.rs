use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::path::{ParamsShape, PathParams};
use crate::reply::{ReplyShape, Single};

/// Value types a route's handler works with, one per request part plus the
/// reply discipline.
///
/// Implemented by [`Schema`]; a unit struct can implement it directly to
/// name a route's schema:
///
/// ```rust
/// use routeshape::path::PathParams;
/// use routeshape::reply::Single;
/// use routeshape::schema::RouteSchema;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct NewUser {
///     name: String,
/// }
///
/// struct CreateUser;
///
/// impl RouteSchema for CreateUser {
///     type Body = NewUser;
///     type Headers = serde_json::Value;
///     type Querystring = serde_json::Value;
///     type Params = PathParams;
///     type Response = Single<u64>;
/// }
/// ```
pub trait RouteSchema: 'static {
    type Body: DeserializeOwned + Send + 'static;
    type Headers: DeserializeOwned + Send + 'static;
    type Querystring: DeserializeOwned + Send + 'static;
    type Params: ParamsShape;
    type Response: ReplyShape;
}

/// Schema declaration built member by member.
///
/// Every member left undeclared resolves to an unconstrained type:
/// `serde_json::Value` for body, headers and querystring, [`PathParams`]
/// (derived from the route template) for params, and `Single<Value>` for
/// the response. Members are independent of each other.
///
/// ```rust
/// use routeshape::responses;
/// use routeshape::schema::Schema;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Paging {
///     limit: u32,
/// }
///
/// let schema = Schema::new()
///     .querystring::<Paging>()
///     .responses::<responses![200 => Vec<String>, 400 => String]>();
/// ```
pub struct Schema<B = Value, H = Value, Q = Value, P = PathParams, R = Single<Value>>(
    PhantomData<fn() -> (B, H, Q, P, R)>,
);

impl Schema {
    /// Empty declaration: every member unconstrained
    #[must_use]
    pub const fn new() -> Self {
        Schema(PhantomData)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl<B, H, Q, P, R> Clone for Schema<B, H, Q, P, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B, H, Q, P, R> Copy for Schema<B, H, Q, P, R> {}

impl<B, H, Q, P, R> std::fmt::Debug for Schema<B, H, Q, P, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("body", &std::any::type_name::<B>())
            .field("headers", &std::any::type_name::<H>())
            .field("querystring", &std::any::type_name::<Q>())
            .field("params", &std::any::type_name::<P>())
            .field("response", &std::any::type_name::<R>())
            .finish()
    }
}

impl<B, H, Q, P, R> Schema<B, H, Q, P, R> {
    #[must_use]
    pub fn body<T>(self) -> Schema<T, H, Q, P, R> {
        Schema(PhantomData)
    }

    #[must_use]
    pub fn headers<T>(self) -> Schema<B, T, Q, P, R> {
        Schema(PhantomData)
    }

    #[must_use]
    pub fn querystring<T>(self) -> Schema<B, H, T, P, R> {
        Schema(PhantomData)
    }

    /// Replace the template-derived params record with a typed one.
    ///
    /// If `T` declares its parameter names (see `#[route_params]`),
    /// registration checks them against the route template.
    #[must_use]
    pub fn params<T>(self) -> Schema<B, H, Q, T, R> {
        Schema(PhantomData)
    }

    /// Single response schema: any status may send a `T`
    #[must_use]
    pub fn response<T>(self) -> Schema<B, H, Q, P, Single<T>> {
        Schema(PhantomData)
    }

    /// Per-status response schemas, declared with [`responses!`](crate::responses)
    #[must_use]
    pub fn responses<L>(self) -> Schema<B, H, Q, P, L> {
        Schema(PhantomData)
    }
}

impl<B, H, Q, P, R> RouteSchema for Schema<B, H, Q, P, R>
where
    B: DeserializeOwned + Send + 'static,
    H: DeserializeOwned + Send + 'static,
    Q: DeserializeOwned + Send + 'static,
    P: ParamsShape,
    R: ReplyShape,
{
    type Body = B;
    type Headers = H;
    type Querystring = Q;
    type Params = P;
    type Response = R;
}
