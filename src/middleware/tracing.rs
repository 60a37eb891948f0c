use std::time::Duration;

use tracing::info;

use super::Middleware;
use crate::dispatcher::{HandlerRequest, HandlerResponse};

/// Logs one line per completed request and echoes the request id back in
/// an `x-request-id` response header.
pub struct RequestLogMiddleware;

impl Middleware for RequestLogMiddleware {
    fn after(&self, req: &HandlerRequest, res: &mut HandlerResponse, latency: Duration) {
        res.set_header("x-request-id", req.request_id.to_string());
        info!(
            request_id = %req.request_id,
            method = %req.method,
            path = %req.path,
            handler = %req.handler_name,
            status = res.status,
            latency_ms = latency.as_millis() as u64,
            "request completed"
        );
    }
}
