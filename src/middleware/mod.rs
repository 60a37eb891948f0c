//! Middleware hooks run by the dispatcher around every handler.

mod core;
mod tracing;

pub use self::core::Middleware;
pub use self::tracing::RequestLogMiddleware;
