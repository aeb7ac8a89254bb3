/*
 * Responsibility
 * - Identity tokens: issue on sign-in, verify on protected routes
 * - HTTP concerns (header parsing, status mapping) belong to the auth gate
 */
pub mod factory;
pub mod token_service;

pub use factory::build_token_service;
pub use token_service::{Claims, DEFAULT_TOKEN_TTL_SECONDS, TokenError, TokenService};
