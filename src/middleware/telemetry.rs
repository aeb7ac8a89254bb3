//! Access logging + HTTP metrics.
//!
//! Wraps everything behind it (CORS short-circuits included), so the elapsed
//! time is the full latency of the stack. The response passes through untouched.
//!
//! Logs carry the raw path; metrics are labelled with the route template only.

use std::sync::Arc;

use axum::{extract::Request, http::Method, response::Response};
use tracing::{error, info};

use crate::middleware::chain::{BoxFuture, Interceptor, Next};
use crate::middleware::recorder::{RequestStart, RequestTrace, route_label};
use crate::services::metrics::HttpMetrics;

const KNOWN_METHODS: [Method; 9] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::PATCH,
    Method::HEAD,
    Method::OPTIONS,
    Method::CONNECT,
    Method::TRACE,
];

// Extension methods collapse into one label.
fn method_label(method: &Method) -> &str {
    if KNOWN_METHODS.contains(method) {
        method.as_str()
    } else {
        "OTHER"
    }
}

#[derive(Debug, Clone)]
pub struct Telemetry {
    metrics: Arc<HttpMetrics>,
}

impl Telemetry {
    pub fn new(metrics: Arc<HttpMetrics>) -> Self {
        Self { metrics }
    }
}

impl Interceptor for Telemetry {
    fn intercept<'a>(&'a self, mut req: Request, next: Next<'a>) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let mut trace = RequestTrace::begin(&req);
            req.extensions_mut().insert(RequestStart(trace.started()));

            let response = next.run(req).await;
            trace.record(&response);

            let elapsed = trace.elapsed();
            let status = trace.status();
            self.metrics.observe(
                method_label(trace.method()),
                route_label(&response),
                status,
                elapsed,
            );

            // The request id layer sits inside this stage; read it from the response.
            let request_id = response
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("-");

            if status.is_server_error() {
                error!(
                    method = %trace.method(),
                    path = %trace.path(),
                    status = status.as_u16(),
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    request_id,
                    "request failed"
                );
            } else {
                info!(
                    method = %trace.method(),
                    path = %trace.path(),
                    status = status.as_u16(),
                    elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                    request_id,
                    "request completed"
                );
            }

            response
        })
    }
}
