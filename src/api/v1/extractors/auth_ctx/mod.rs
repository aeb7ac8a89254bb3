/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - Hand the identity established by the auth gate (AuthCtx) to handlers
 * - axum plumbing lives in core, the type itself in types
 *
 * Public API:
 * - AuthCtx
 * - AuthCtxExtractor
 */

mod core;
mod types;

pub use core::AuthCtxExtractor;
pub use types::AuthCtx;
