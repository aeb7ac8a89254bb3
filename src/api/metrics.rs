//! GET /metrics: Prometheus text exposition of the HTTP metrics registry.
use axum::{extract::State, http::header, response::IntoResponse};
use tracing::error;

use crate::{error::AppError, state::AppState};

pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = state.metrics.render().map_err(|e| {
        error!(error = %e, "encoding metrics failed");
        AppError::Internal
    })?;

    Ok(([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body))
}
