//! Errors callers need to tell apart. Everything else travels as
//! `anyhow::Error` with context attached.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocflowError {
    /// The category collection could not be read. Classification cannot
    /// proceed and must not be reported as `Unassigned`.
    #[error("category store unavailable: {0}")]
    StoreUnavailable(#[source] anyhow::Error),

    #[error("invalid category: {0}")]
    InvalidCategory(String),

    #[error("category already exists: {0}")]
    DuplicateCategory(String),

    #[error("category not found: {0}")]
    CategoryNotFound(i64),

    #[error("document not found: {0}")]
    DocumentNotFound(i64),

    #[error("unknown document status: {0}")]
    UnknownStatus(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DocflowError>;
