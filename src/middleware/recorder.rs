/*
 * Responsibility
 * - Per-request trace state (method / path / start / status)
 * - Capture the final status from the Response produced downstream
 * - The start instant is also published as `RequestStart` in request extensions
 * - The matched route template travels back on the response as `MatchedRoute`
 */
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{MatchedPath, Request},
    http::{Method, StatusCode},
    response::Response,
};

use crate::middleware::chain::{BoxFuture, Interceptor, Next};

/// Route label for requests that never reached a route.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Route label for preflights answered before routing.
pub const PREFLIGHT_ROUTE: &str = "preflight";

/// Start instant of the current request, visible to every inner stage.
#[derive(Debug, Clone, Copy)]
pub struct RequestStart(pub Instant);

/// Route template (`/api/v1/files/{key}`) that served a response.
///
/// Set as a response extension by [`RouteTag`]; stages outside the router read
/// it back to label the request without using the raw path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedRoute(Arc<str>);

impl MatchedRoute {
    pub fn new(template: &str) -> Self {
        Self(Arc::from(template))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Copies axum's `MatchedPath` onto the response. Must run as a route layer,
/// where the path has already been matched.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteTag;

impl Interceptor for RouteTag {
    fn intercept<'a>(&'a self, req: Request, next: Next<'a>) -> BoxFuture<'a, Response> {
        let route = req
            .extensions()
            .get::<MatchedPath>()
            .map(|p| MatchedRoute::new(p.as_str()));

        Box::pin(async move {
            let mut response = next.run(req).await;
            if let Some(route) = route {
                response.extensions_mut().insert(route);
            }
            response
        })
    }
}

/// Route label for metrics: the matched template, or a fixed fallback.
pub fn route_label(response: &Response) -> &str {
    response
        .extensions()
        .get::<MatchedRoute>()
        .map_or(UNMATCHED_ROUTE, MatchedRoute::as_str)
}

/// Trace state assembled across the chain for a single request.
///
/// The status defaults to `200 OK` until a response is recorded, which is
/// what an HTTP server reports when a handler never sets one explicitly.
#[derive(Debug)]
pub struct RequestTrace {
    method: Method,
    path: String,
    started: Instant,
    status: StatusCode,
}

impl RequestTrace {
    pub fn begin(req: &Request) -> Self {
        Self {
            method: req.method().clone(),
            path: req.uri().path().to_owned(),
            started: Instant::now(),
            status: StatusCode::OK,
        }
    }

    pub fn record(&mut self, response: &Response) {
        self.status = response.status();
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
