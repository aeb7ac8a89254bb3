/*
 * Responsibility
 * - Users request/response DTOs
 * - validate() for shape checks before hitting the store
 */
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if self.name.len() > 256 {
            return Err("name must be <= 256 chars");
        }
        Ok(())
    }
}
