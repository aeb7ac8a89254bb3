use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub status: &'static str,
    pub route: &'static str,
    pub token: String,
}
