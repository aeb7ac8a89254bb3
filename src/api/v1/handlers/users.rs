/*
 * Responsibility
 * - /users handlers
 * - Json via extractor, DTO validation → UserStore
 */
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use tracing::error;

use crate::{
    api::v1::dto::users::CreateUserRequest, error::AppError, repos::User, state::AppState,
};

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let users = state.users.list_users().await.map_err(|e| {
        error!(error = ?e, "listing users failed");
        AppError::Internal
    })?;

    Ok(Json(users))
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let Json(req) = payload?;
    req.validate().map_err(AppError::bad_request)?;

    let user = state
        .users
        .create_user(req.name.trim())
        .await
        .map_err(|e| {
            error!(error = ?e, "creating user failed");
            AppError::Internal
        })?;

    Ok((StatusCode::CREATED, Json(user)))
}
