/*
 * Responsibility
 * - v1 URL structure
 * - Which routes sit behind the auth gate (route_layer per route)
 */
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use crate::api::v1::handlers::{
    auth::{sign_in, sign_out},
    files::{get_file, list_files, upload_file},
    health::health,
    mail::{send_html_mail, send_plain_mail},
    secure::secure,
    users::{create_user, list_users},
};
use crate::middleware::{auth::AuthGate, chain::Chain};
use crate::services::auth::TokenService;
use crate::state::AppState;

pub fn routes(tokens: Arc<TokenService>) -> Router<AppState> {
    let gate = Chain::new().with(AuthGate::new(tokens));

    Router::new()
        .route("/healthz", get(health))
        .route("/secure", get(secure).route_layer(gate))
        .route("/auth/signin", post(sign_in))
        .route("/auth/signout", get(sign_out))
        .route("/users", get(list_users).post(create_user))
        .route("/files", get(list_files).post(upload_file))
        .route("/files/{key}", get(get_file))
        .route("/mail/plain", post(send_plain_mail))
        .route("/mail/html", post(send_html_mail))
}
