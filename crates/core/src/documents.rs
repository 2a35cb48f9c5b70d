//! Document records: the library of uploaded files and their review state.

use crate::error::{DocflowError, Result};
use crate::models::{Document, DocumentStatus, UNASSIGNED};
use anyhow::Context;
use sqlx::SqlitePool;
use std::path::PathBuf;
use storage::models::DocumentRow;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub filename: String,
    pub path: PathBuf,
    pub category: String,
    pub file_size: u64,
    pub mime_type: String,
    pub content_hash: Option<String>,
}

impl NewDocument {
    pub fn new(filename: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            path: path.into(),
            category: UNASSIGNED.to_string(),
            file_size: 0,
            mime_type: crate::models::DEFAULT_MIME.to_string(),
            content_hash: None,
        }
    }
}

#[derive(Clone)]
pub struct DocumentRepo {
    pool: SqlitePool,
}

impl DocumentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, doc: NewDocument) -> Result<Document> {
        let now = chrono::Utc::now().timestamp();
        let id = sqlx::query(
            r#"
            INSERT INTO documents (filename, path, category, status, file_size, mime_type, content_hash, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            "#,
        )
        .bind(&doc.filename)
        .bind(doc.path.to_string_lossy())
        .bind(&doc.category)
        .bind(DocumentStatus::default().as_str())
        .bind(doc.file_size as i64)
        .bind(&doc.mime_type)
        .bind(&doc.content_hash)
        .bind(now)
        .execute(&self.pool)
        .await
        .context("insert document")?
        .last_insert_rowid();
        self.get(id).await
    }

    pub async fn get(&self, id: i64) -> Result<Document> {
        let row = sqlx::query_as::<_, DocumentRow>("SELECT * FROM documents WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("load document")?
            .ok_or(DocflowError::DocumentNotFound(id))?;
        Document::try_from(row)
    }

    /// All documents, newest first.
    pub async fn list(&self) -> Result<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            "SELECT * FROM documents ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .context("list documents")?;
        rows.into_iter().map(Document::try_from).collect()
    }

    pub async fn set_status(&self, id: i64, status: DocumentStatus) -> Result<Document> {
        let res = sqlx::query("UPDATE documents SET status = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(status.as_str())
            .bind(chrono::Utc::now().timestamp())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("update document status")?;
        if res.rows_affected() == 0 {
            return Err(DocflowError::DocumentNotFound(id));
        }
        info!("document {} moved to {}", id, status);
        self.get(id).await
    }

    pub async fn set_category(&self, id: i64, category: &str) -> Result<()> {
        let res = sqlx::query("UPDATE documents SET category = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(category)
            .bind(chrono::Utc::now().timestamp())
            .bind(id)
            .execute(&self.pool)
            .await
            .context("update document category")?;
        if res.rows_affected() == 0 {
            return Err(DocflowError::DocumentNotFound(id));
        }
        Ok(())
    }

    /// Deletes the record and its stored file. A file that is already gone
    /// is not an error; a file still referenced by another document (same
    /// content uploaded twice) is kept.
    pub async fn delete(&self, id: i64) -> Result<Document> {
        let doc = self.get(id).await?;
        let path = PathBuf::from(&doc.path);
        let shared: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE path = ?1 AND id != ?2")
                .bind(&doc.path)
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .context("count document references")?;
        if shared == 0 && path.exists() {
            if let Err(err) = std::fs::remove_file(&path) {
                warn!("could not remove stored file {:?}: {}", path, err);
                return Err(err.into());
            }
        }
        sqlx::query("DELETE FROM documents WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("delete document")?;
        info!("deleted document {} ({})", id, doc.filename);
        Ok(doc)
    }

    /// Copies the stored file to `dest_dir` under its display name and
    /// returns the written path.
    pub async fn export(&self, id: i64, dest_dir: &std::path::Path) -> Result<PathBuf> {
        let doc = self.get(id).await?;
        std::fs::create_dir_all(dest_dir)?;
        let name = std::path::Path::new(&doc.filename)
            .file_name()
            .map(|n| n.to_owned())
            .unwrap_or_else(|| format!("document-{}", doc.id).into());
        let dest = dest_dir.join(name);
        std::fs::copy(&doc.path, &dest)?;
        Ok(dest)
    }
}
