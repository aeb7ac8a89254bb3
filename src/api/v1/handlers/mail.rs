/*
 * Responsibility
 * - POST /mail/plain, POST /mail/html → MailSender
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::error;

use crate::{
    api::v1::dto::mail::{MailRequest, MailResponse},
    error::AppError,
    services::mail::TemplateData,
    state::AppState,
};

const SENT: MailResponse = MailResponse {
    message: "mail sent",
};

pub async fn send_plain_mail(
    State(state): State<AppState>,
    payload: Result<Json<MailRequest>, JsonRejection>,
) -> Result<Json<MailResponse>, AppError> {
    let Json(req) = payload?;
    req.validate().map_err(AppError::bad_request)?;

    state
        .mailer
        .send_plain(&req.subject, &req.email, &req.name)
        .await
        .map_err(|e| {
            error!(error = ?e, "sending plain mail failed");
            AppError::Internal
        })?;

    Ok(Json(SENT))
}

pub async fn send_html_mail(
    State(state): State<AppState>,
    payload: Result<Json<MailRequest>, JsonRejection>,
) -> Result<Json<MailResponse>, AppError> {
    let Json(req) = payload?;
    req.validate().map_err(AppError::bad_request)?;

    let data = TemplateData { name: req.name };
    state
        .mailer
        .send_html(&req.subject, &req.email, &data)
        .await
        .map_err(|e| {
            error!(error = ?e, "sending html mail failed");
            AppError::Internal
        })?;

    Ok(Json(SENT))
}
