use std::marker::PhantomData;

/// A status code lifted to the type level.
///
/// Passed to [`MultiReply::status`](super::MultiReply::status) to pick the
/// response schema declared for that code: `reply.status(Code::<201>)` or
/// one of the named constants in [`codes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Code<const N: u16>;

impl<const N: u16> Code<N> {
    pub const VALUE: u16 = N;

    #[must_use]
    pub const fn as_u16(self) -> u16 {
        N
    }
}

/// Named type-level status codes
pub mod codes {
    use super::Code;

    pub const OK: Code<200> = Code;
    pub const CREATED: Code<201> = Code;
    pub const ACCEPTED: Code<202> = Code;
    pub const NO_CONTENT: Code<204> = Code;
    pub const MOVED_PERMANENTLY: Code<301> = Code;
    pub const FOUND: Code<302> = Code;
    pub const NOT_MODIFIED: Code<304> = Code;
    pub const BAD_REQUEST: Code<400> = Code;
    pub const UNAUTHORIZED: Code<401> = Code;
    pub const FORBIDDEN: Code<403> = Code;
    pub const NOT_FOUND: Code<404> = Code;
    pub const CONFLICT: Code<409> = Code;
    pub const UNPROCESSABLE_ENTITY: Code<422> = Code;
    pub const TOO_MANY_REQUESTS: Code<429> = Code;
    pub const INTERNAL_SERVER_ERROR: Code<500> = Code;
    pub const SERVICE_UNAVAILABLE: Code<503> = Code;
}

/// One entry of a per-status response declaration: code `N` replies with `T`.
pub struct Status<const N: u16, T>(PhantomData<fn() -> T>);

/// Type-level list cell of a per-status response declaration.
///
/// Built by [`responses!`](crate::responses) rather than by hand.
pub struct Cons<H, T>(PhantomData<fn() -> (H, T)>);

/// End of a per-status response declaration list.
pub struct Nil;

/// Index: the wanted entry is the head of the list
pub struct Here;

/// Index: the wanted entry is somewhere in the tail
pub struct There<I>(PhantomData<fn() -> I>);

/// Look up the body type declared for status `N`.
///
/// `I` is a position index inferred by the compiler; callers never name it.
/// A code that is not declared has no impl, so selecting it does not compile.
pub trait Select<const N: u16, I> {
    type Body;
}

impl<const N: u16, T, Tail> Select<N, Here> for Cons<Status<N, T>, Tail> {
    type Body = T;
}

impl<const N: u16, H, Tail, I> Select<N, There<I>> for Cons<H, Tail>
where
    Tail: Select<N, I>,
{
    type Body = <Tail as Select<N, I>>::Body;
}

/// Runtime view of a declaration list: the codes it declares, in order.
pub trait ResponseList {
    fn collect_codes(out: &mut Vec<u16>);
}

impl ResponseList for Nil {
    fn collect_codes(_out: &mut Vec<u16>) {}
}

impl<const N: u16, T, Tail: ResponseList> ResponseList for Cons<Status<N, T>, Tail> {
    fn collect_codes(out: &mut Vec<u16>) {
        out.push(N);
        Tail::collect_codes(out);
    }
}

/// Declare per-status response types.
///
/// ```rust
/// use routeshape::responses;
///
/// type Replies = responses![200 => String, 404 => serde_json::Value];
/// ```
///
/// Expands to a [`Cons`] list of [`Status`] entries; use it as the
/// response member of a schema with
/// [`Schema::responses`](crate::schema::Schema::responses).
#[macro_export]
macro_rules! responses {
    () => { $crate::reply::Nil };
    ($code:literal => $body:ty $(, $rest_code:literal => $rest_body:ty)* $(,)?) => {
        $crate::reply::Cons<
            $crate::reply::Status<$code, $body>,
            $crate::responses!($($rest_code => $rest_body),*)
        >
    };
}
