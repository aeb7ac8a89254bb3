/*
 * Responsibility
 * - POST /files: multipart upload (field `file`) to object storage
 * - GET /files, GET /files/{key}: listing and public URL lookup
 */
use std::path::Path as FsPath;

use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
};
use tracing::{error, info};
use uuid::Uuid;

use crate::{
    api::v1::dto::files::{ObjectUrlResponse, UploadResponse},
    error::AppError,
    services::storage::{ObjectMeta, StorageError, content_type_for, object_url},
    state::AppState,
};

const FILE_FIELD: &str = "file";

pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart.map_err(|rej| AppError::bad_request(rej.body_text()))?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            let file_name = field.file_name().unwrap_or_default().to_owned();
            let data = field.bytes().await?;
            upload = Some((file_name, data));
            break;
        }
    }
    let (file_name, data) =
        upload.ok_or_else(|| AppError::bad_request("missing multipart field `file`"))?;

    let file_type = extension_of(&file_name);
    let key = format!("{}{}", Uuid::new_v4(), file_type);
    let file_size = data.len();

    state
        .objects
        .upload(
            &state.storage.bucket,
            &key,
            data,
            &content_type_for(&file_type),
        )
        .await
        .map_err(|e| {
            error!(error = ?e, key = %key, "upload failed");
            AppError::Internal
        })?;

    info!(key = %key, file_size, "file uploaded");

    Ok(Json(UploadResponse {
        file_name,
        file_type,
        file_size,
        url: object_url(&state.storage.bucket, &state.storage.region, &key),
    }))
}

pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<ObjectMeta>>, AppError> {
    let objects = state
        .objects
        .list(&state.storage.bucket)
        .await
        .map_err(|e| {
            error!(error = ?e, "listing objects failed");
            AppError::Internal
        })?;

    Ok(Json(objects))
}

pub async fn get_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ObjectUrlResponse>, AppError> {
    match state.objects.get(&state.storage.bucket, &key).await {
        Ok(_) => Ok(Json(ObjectUrlResponse {
            url: object_url(&state.storage.bucket, &state.storage.region, &key),
        })),
        Err(StorageError::NotFound(_)) => Err(AppError::NotFound("object")),
        Err(e) => {
            error!(error = ?e, key = %key, "fetching object failed");
            Err(AppError::Internal)
        }
    }
}

/// Lowercase extension including the dot, or empty.
fn extension_of(file_name: &str) -> String {
    FsPath::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_default()
}
