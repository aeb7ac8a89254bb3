//! HTTP-level middleware (cross-cutting concerns).
//!
//! Transport/infrastructure concerns applied to every route, regardless of API
//! version:
//! - Request-Id generation + propagation (`x-request-id`)
//! - Body size limit
//! - Global timeout
//!
//! Access logging is not done here; the telemetry interceptor wraps this stack.

use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::extract::DefaultBodyLimit;
use axum::http::{StatusCode, header::HeaderName};
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Uploads go through multipart, so this also bounds file size.
pub const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Apply HTTP-level middleware to the given Router.
pub fn apply(router: Router) -> Router {
    apply_with_timeout(router, REQUEST_TIMEOUT)
}

fn apply_with_timeout(router: Router, timeout: Duration) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    let layers = ServiceBuilder::new()
        // Generate a request id if missing, then propagate it to the response.
        // Outside the error handler so 408/500 responses carry it too.
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        // Make the service error `Infallible` by converting errors into responses.
        .layer(HandleErrorLayer::new(|err: BoxError| async move {
            if err.is::<tower::timeout::error::Elapsed>() {
                StatusCode::REQUEST_TIMEOUT
            } else {
                tracing::error!(error = %err, "unhandled transport error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(TimeoutLayer::new(timeout));

    // axum's own 2 MiB extractor default would otherwise win over the layer above.
    router
        .layer(DefaultBodyLimit::disable())
        .layer(layers)
}
