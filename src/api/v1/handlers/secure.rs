/*
 * Responsibility
 * - GET /secure: protected by the auth gate, echoes the authenticated subject
 */
use axum::Json;
use serde_json::{Value, json};

use crate::api::v1::extractors::AuthCtxExtractor;

pub async fn secure(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "route": "secure",
        "userID": ctx.subject,
    }))
}
