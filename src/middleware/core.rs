use std::time::Duration;

use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Hook around handler dispatch.
///
/// `before` may answer the request itself by returning a response, in which
/// case the handler is skipped. `after` sees every response, including
/// short-circuited ones, together with the time spent since dispatch began.
pub trait Middleware: Send + Sync {
    fn before(&self, _req: &HandlerRequest) -> Option<HandlerResponse> {
        None
    }
    fn after(&self, _req: &HandlerRequest, _res: &mut HandlerResponse, _latency: Duration) {}
}
