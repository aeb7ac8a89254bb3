//! Object storage interface used by the file handlers.
use async_trait::async_trait;
use axum::body::Bytes;
use mime_guess::mime;
use serde::Serialize;
use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage-layer errors.
///
/// Kept independent from `AppError`; a missing object is the only case callers
/// treat differently.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectMeta {
    pub key: String,
    pub size: u64,
}

#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    // Backend name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> StorageResult<()>;

    // `StorageError::NotFound` when the key does not exist.
    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Bytes>;

    async fn list(&self, bucket: &str) -> StorageResult<Vec<ObjectMeta>>;
}

/// Public URL of an object in a regional S3 bucket.
pub fn object_url(bucket: &str, region: &str, key: &str) -> String {
    format!("https://{bucket}.s3.{region}.amazonaws.com/{key}")
}

/// Content type guessed from a file extension including the dot (`".png"`).
/// Unknown or missing extensions fall back to `application/octet-stream`;
/// text types carry `charset=utf-8`.
pub fn content_type_for(extension: &str) -> String {
    let guess = mime_guess::from_ext(extension.trim_start_matches('.')).first_or_octet_stream();

    if guess.type_() == mime::TEXT && guess.get_param(mime::CHARSET).is_none() {
        format!("{guess}; charset=utf-8")
    } else {
        guess.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_regional_url() {
        assert_eq!(
            object_url("media", "eu-north-1", "abc.png"),
            "https://media.s3.eu-north-1.amazonaws.com/abc.png"
        );
    }

    #[test]
    fn unknown_extension_is_octet_stream() {
        assert_eq!(content_type_for(".weird"), "application/octet-stream");
        assert_eq!(content_type_for(""), "application/octet-stream");
    }

    #[test]
    fn guesses_common_and_office_types() {
        assert_eq!(content_type_for(".png"), "image/png");
        assert_eq!(content_type_for(".pdf"), "application/pdf");
        assert_eq!(content_type_for(".txt"), "text/plain; charset=utf-8");
        assert_eq!(
            content_type_for(".docx"),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert!(content_type_for(".wav").starts_with("audio/"));
        assert_eq!(content_type_for(".webm"), "video/webm");
    }
}
