use crate::error::DocflowError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use storage::models::{CategoryRow, DocumentRow};

/// Category name assigned when no category scores above zero.
pub const UNASSIGNED: &str = "Unassigned";

pub const DEFAULT_MIME: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub keywords: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: i64,
}

impl Category {
    /// Builds a detached category, mostly useful for snapshots assembled
    /// in memory.
    pub fn new(name: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            id: 0,
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            description: String::new(),
            created_at: 0,
        }
    }
}

impl TryFrom<CategoryRow> for Category {
    type Error = serde_json::Error;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        let keywords = row.keywords()?;
        Ok(Category {
            id: row.id,
            name: row.name,
            keywords,
            description: row.description,
            created_at: row.created_at,
        })
    }
}

/// Review workflow a document moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    Draft,
    PendingReview,
    Approved,
    Archived,
}

impl DocumentStatus {
    pub const ALL: [DocumentStatus; 4] = [
        DocumentStatus::Draft,
        DocumentStatus::PendingReview,
        DocumentStatus::Approved,
        DocumentStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Draft => "draft",
            DocumentStatus::PendingReview => "pending_review",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = DocflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "draft" => Ok(DocumentStatus::Draft),
            "pending_review" | "pendingreview" => Ok(DocumentStatus::PendingReview),
            "approved" => Ok(DocumentStatus::Approved),
            "archived" => Ok(DocumentStatus::Archived),
            _ => Err(DocflowError::UnknownStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub filename: String,
    pub path: String,
    pub category: String,
    pub status: DocumentStatus,
    pub file_size: u64,
    pub mime_type: String,
    pub content_hash: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TryFrom<DocumentRow> for Document {
    type Error = DocflowError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        Ok(Document {
            id: row.id,
            status: row.status.parse()?,
            filename: row.filename,
            path: row.path,
            category: row.category,
            file_size: row.file_size.max(0) as u64,
            mime_type: row.mime_type,
            content_hash: row.content_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_workflow_names() {
        assert_eq!("Draft".parse::<DocumentStatus>().unwrap(), DocumentStatus::Draft);
        assert_eq!(
            "pending-review".parse::<DocumentStatus>().unwrap(),
            DocumentStatus::PendingReview
        );
        assert_eq!(
            "PendingReview".parse::<DocumentStatus>().unwrap(),
            DocumentStatus::PendingReview
        );
        assert_eq!(" archived ".parse::<DocumentStatus>().unwrap(), DocumentStatus::Archived);
        assert!(matches!(
            "deleted".parse::<DocumentStatus>(),
            Err(DocflowError::UnknownStatus(s)) if s == "deleted"
        ));
    }

    #[test]
    fn status_round_trips_through_storage_name() {
        for status in DocumentStatus::ALL {
            assert_eq!(status.as_str().parse::<DocumentStatus>().unwrap(), status);
        }
    }
}
