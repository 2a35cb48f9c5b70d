use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    /// JSON array of keyword strings, in the order they were configured.
    pub keywords_json: String,
    pub description: String,
    pub created_at: i64,
}

impl CategoryRow {
    /// Decodes the stored keyword list. A malformed column yields an error
    /// instead of an empty list so a corrupt row is never silently unscored.
    pub fn keywords(&self) -> Result<Vec<String>, serde_json::Error> {
        serde_json::from_str(&self.keywords_json)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct DocumentRow {
    pub id: i64,
    pub filename: String,
    pub path: String,
    pub category: String,
    pub status: String,
    pub file_size: i64,
    pub mime_type: String,
    pub content_hash: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}
