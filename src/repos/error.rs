/*
 * Responsibility
 * - Meaning of store failures as seen by callers
 * - Independent of AppError: handlers decide how a failure maps to HTTP
 */
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("db error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}
