//! In-memory `ObjectStore` for tests and local runs without AWS.
use std::collections::BTreeMap;

use async_trait::async_trait;
use axum::body::Bytes;
use tokio::sync::RwLock;

use crate::services::storage::client::{ObjectMeta, ObjectStore, StorageError, StorageResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
}

#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    // (bucket, key) -> object
    objects: RwLock<BTreeMap<(String, String), StoredObject>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn stored(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_owned(), key.to_owned()))
            .cloned()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> StorageResult<()> {
        self.objects.write().await.insert(
            (bucket.to_owned(), key.to_owned()),
            StoredObject {
                body,
                content_type: content_type.to_owned(),
            },
        );
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Bytes> {
        self.stored(bucket, key)
            .await
            .map(|o| o.body)
            .ok_or_else(|| StorageError::NotFound(key.to_owned()))
    }

    async fn list(&self, bucket: &str) -> StorageResult<Vec<ObjectMeta>> {
        Ok(self
            .objects
            .read()
            .await
            .iter()
            .filter(|((b, _), _)| b == bucket)
            .map(|((_, key), obj)| ObjectMeta {
                key: key.clone(),
                size: obj.body.len() as u64,
            })
            .collect())
    }
}
