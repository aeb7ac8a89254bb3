/// Factory: build the `TokenService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::TokenService;

pub fn build_token_service(config: &Config) -> Arc<TokenService> {
    Arc::new(TokenService::new(config.jwt_secret.as_bytes()).with_ttl(config.token_ttl))
}
