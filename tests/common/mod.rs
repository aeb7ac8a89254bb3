#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum_test::TestServer;

use api_scaffold::{
    app::build_app,
    middleware::cors::{CorsConfig, CorsSettings},
    repos::{InMemoryUserStore, RepoError, User, UserStore},
    services::{
        auth::TokenService,
        mail::InMemoryMailSender,
        metrics::HttpMetrics,
        storage::InMemoryObjectStore,
    },
    state::{AppState, StorageSettings},
};

pub const SECRET: &[u8] = b"integration-secret";
pub const BUCKET: &str = "media";
pub const REGION: &str = "eu-north-1";

pub struct Harness {
    pub server: TestServer,
    pub app: Router,
    pub tokens: Arc<TokenService>,
    pub objects: Arc<InMemoryObjectStore>,
    pub mailer: Arc<InMemoryMailSender>,
    pub metrics: Arc<HttpMetrics>,
}

pub fn harness() -> Harness {
    harness_with(Arc::new(InMemoryUserStore::new()), None)
}

pub fn harness_with(users: Arc<dyn UserStore>, cors: Option<CorsConfig>) -> Harness {
    let tokens = Arc::new(TokenService::new(SECRET));
    let objects = Arc::new(InMemoryObjectStore::new());
    let mailer = Arc::new(InMemoryMailSender::new());
    let metrics = Arc::new(HttpMetrics::new().expect("metrics registry"));

    let state = AppState {
        tokens: tokens.clone(),
        users,
        objects: objects.clone(),
        mailer: mailer.clone(),
        metrics: metrics.clone(),
        storage: StorageSettings {
            bucket: BUCKET.to_string(),
            region: REGION.to_string(),
        },
    };

    let settings = Arc::new(CorsSettings::new());
    if let Some(config) = cors {
        settings.configure(config);
    }

    let app = build_app(state, settings);
    let server = TestServer::new(app.clone()).expect("test server");

    Harness {
        server,
        app,
        tokens,
        objects,
        mailer,
        metrics,
    }
}

/// A store whose backend is always down.
pub struct FailingUserStore;

#[async_trait]
impl UserStore for FailingUserStore {
    async fn create_user(&self, _name: &str) -> Result<User, RepoError> {
        Err(RepoError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        Err(RepoError::Db(sqlx::Error::PoolTimedOut))
    }
}
