use serde::Deserialize;

use crate::error::AppError;

/// Extractor for routes ending in `/{id}`.
#[derive(Debug, Deserialize)]
pub struct IdPath {
    pub id: String,
}

impl IdPath {
    /// Rejects blank ids before they reach the store or a cache key.
    pub fn validate(&self) -> Result<&str, AppError> {
        let id = self.id.trim();
        if id.is_empty() {
            return Err(AppError::BadRequest("Id cannot be empty".to_string()));
        }
        Ok(id)
    }
}
