//! Bearer token gate.
//!
//! `Authorization: Bearer <jwt>` is verified with the [`TokenService`]; on
//! success the identity is inserted as [`AuthCtx`] into the request extensions,
//! otherwise the chain is short-circuited with an error response.
//!
//! Applied per route:
//! ```ignore
//! get(handler).route_layer(Chain::new().with(AuthGate::new(tokens)))
//! ```

use std::sync::Arc;

use axum::{
    extract::Request,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::info;

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::middleware::chain::{BoxFuture, Interceptor, Next};
use crate::services::auth::TokenService;

#[derive(Debug, Clone)]
pub struct AuthGate {
    tokens: Arc<TokenService>,
}

impl AuthGate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    fn authenticate(&self, req: &Request) -> Result<AuthCtx, AppError> {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| AppError::unauthorized("invalid token format"))?;

        let claims = self.tokens.verify(token).map_err(|e| {
            info!(error = %e, "token verification failed");
            AppError::forbidden("invalid token")
        })?;

        let expires_at = claims.expires_at;
        let ctx = AuthCtx::from_claims(claims)
            .ok_or_else(|| AppError::bad_request("name claim missing"))?;

        // verify() already rejects elapsed tokens; keep the gate correct on its own.
        if Utc::now() >= expires_at {
            return Err(AppError::forbidden("token expired"));
        }

        Ok(ctx)
    }
}

impl Interceptor for AuthGate {
    fn intercept<'a>(&'a self, mut req: Request, next: Next<'a>) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            match self.authenticate(&req) {
                Ok(ctx) => {
                    req.extensions_mut().insert(ctx);
                    next.run(req).await
                }
                Err(e) => {
                    info!(
                        method = %req.method(),
                        path = %req.uri().path(),
                        status = e.status().as_u16(),
                        reason = %e,
                        "request rejected by auth gate"
                    );
                    e.into_response()
                }
            }
        })
    }
}

/// Split `"Bearer <token>"` into its token.
///
/// Exactly two space-separated parts, the first being `Bearer` and the second
/// non-empty. Anything else is a format error.
pub fn bearer_token(value: &str) -> Option<&str> {
    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}
