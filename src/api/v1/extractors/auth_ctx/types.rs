/*
 * Responsibility
 * - The authenticated identity visible to handlers
 * - The auth gate verifies the token and inserts this into request extensions;
 *   handlers only ever see this type, never raw claims
 */

use chrono::{DateTime, Utc};

use crate::services::auth::Claims;

/// Identity attached to a request that passed the auth gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub subject: String,
    pub not_before: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
}

impl AuthCtx {
    /// Build from verified claims. `None` when the token carries no string subject.
    pub fn from_claims(claims: Claims) -> Option<Self> {
        Some(Self {
            subject: claims.subject?,
            not_before: claims.not_before,
            expires_at: claims.expires_at,
        })
    }
}
