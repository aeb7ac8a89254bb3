/*
 * Responsibility
 * - UserStore port used by the users handlers
 * - PostgreSQL adapter (SQLx) for the users table
 * - Pool creation + migrations at startup
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::repos::error::RepoError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Persistence for users. The database is an opaque collaborator; handlers only
/// see this trait.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    async fn create_user(&self, name: &str) -> Result<User, RepoError>;

    /// Newest first.
    async fn list_users(&self) -> Result<Vec<User>, RepoError>;
}

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, name: &str) -> Result<User, RepoError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name)
            VALUES ($1, $2)
            RETURNING id, name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, RepoError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, created_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}

/// Create a connection pool and run pending migrations.
pub async fn connect_and_migrate(database_url: &str) -> Result<PgPool, RepoError> {
    let pool = PgPool::connect(database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}
