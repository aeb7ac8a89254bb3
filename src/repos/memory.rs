//! In-memory `UserStore` for tests and local runs without PostgreSQL.
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::repos::{RepoError, User, UserStore};

#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(&self, name: &str) -> Result<User, RepoError> {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            created_at: Utc::now(),
        };
        self.users.write().await.push(user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.iter().rev().cloned().collect())
    }
}
