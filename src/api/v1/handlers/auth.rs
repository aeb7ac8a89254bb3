/*
 * Responsibility
 * - POST /auth/signin: issue a token for the given name
 * - GET /auth/signout: tokens are stateless, nothing to revoke server-side
 */
use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde_json::{Value, json};
use tracing::info;

use crate::{
    api::v1::dto::auth::{SignInRequest, SignInResponse},
    error::AppError,
    state::AppState,
};

pub async fn sign_in(
    State(state): State<AppState>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Json<SignInResponse>, AppError> {
    let Json(req) = payload?;

    let token = state.tokens.issue(req.name.trim())?;
    info!(subject = %req.name.trim(), "signed in");

    Ok(Json(SignInResponse {
        status: "ok",
        route: "auth sign in",
        token,
    }))
}

pub async fn sign_out() -> Json<Value> {
    Json(json!({"status": "ok", "route": "auth sign out"}))
}
