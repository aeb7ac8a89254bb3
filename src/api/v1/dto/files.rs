use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub file_name: String,
    pub file_type: String,
    pub file_size: usize,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ObjectUrlResponse {
    pub url: String,
}
