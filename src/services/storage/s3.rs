use async_trait::async_trait;
use aws_sdk_s3::{Client, error::DisplayErrorContext, primitives::ByteStream};
use axum::body::Bytes;
use tracing::{debug, error};

use crate::services::storage::client::{ObjectMeta, ObjectStore, StorageError, StorageResult};

/// S3-backed object store.
#[derive(Clone, Debug)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the ambient AWS configuration, pinned to `region`.
    pub async fn from_env(region: &str) -> Self {
        let aws_cfg = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(region.to_owned()))
            .load()
            .await;
        Self::new(Client::new(&aws_cfg))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn backend_name(&self) -> &'static str {
        "s3"
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> StorageResult<()> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                error!(bucket, key, error = %DisplayErrorContext(&e), "s3 upload failed");
                StorageError::Backend(e.to_string())
            })?;

        debug!(bucket, key, size, "s3 upload done");
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let service_error = e.into_service_error();
                if service_error.is_no_such_key() {
                    StorageError::NotFound(key.to_owned())
                } else {
                    error!(bucket, key, error = %DisplayErrorContext(&service_error), "s3 get failed");
                    StorageError::Backend(service_error.to_string())
                }
            })?;

        let data = output.body.collect().await.map_err(|e| {
            error!(bucket, key, error = %e, "s3 body read failed");
            StorageError::Backend(e.to_string())
        })?;

        Ok(data.into_bytes())
    }

    async fn list(&self, bucket: &str) -> StorageResult<Vec<ObjectMeta>> {
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .into_paginator()
            .send();

        let mut objects = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| {
                error!(bucket, error = %DisplayErrorContext(&e), "s3 list failed");
                StorageError::Backend(e.to_string())
            })?;

            objects.extend(page.contents().iter().filter_map(|obj| {
                Some(ObjectMeta {
                    key: obj.key()?.to_owned(),
                    size: obj.size().and_then(|s| u64::try_from(s).ok()).unwrap_or(0),
                })
            }));
        }

        Ok(objects)
    }
}
