use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct MailRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
}

impl MailRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.email.trim().is_empty() {
            return Err("email is required");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct MailResponse {
    pub message: &'static str,
}
