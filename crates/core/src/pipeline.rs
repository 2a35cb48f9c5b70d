//! Library facade tying the category store, the document records and the
//! classifier together for the upload and maintenance flows.

use crate::classifier::{self, Classification};
use crate::config::AppConfig;
use crate::documents::{DocumentRepo, NewDocument};
use crate::error::{DocflowError, Result};
use crate::ingest;
use crate::models::Document;
use crate::reclassify::{self, ReclassifySummary};
use crate::scanner;
use crate::store::{CategoryStore, SqliteCategoryStore};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub document: Document,
    /// Set when the content was unreadable and only the filename was used.
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub discovered: usize,
    pub imported: usize,
    pub failed: usize,
    pub unassigned: usize,
}

pub struct Library {
    categories: Arc<dyn CategoryStore>,
    documents: DocumentRepo,
    uploads_dir: PathBuf,
    exclude: Vec<String>,
    max_content_bytes: usize,
    workers: usize,
}

impl Library {
    /// Opens the configured database and runs pending migrations.
    pub async fn open(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = storage::open(&config.database.path).await?;
        let categories: Arc<dyn CategoryStore> = Arc::new(SqliteCategoryStore::new(pool.clone()));
        Ok(Self::with_store(config, categories, DocumentRepo::new(pool)))
    }

    pub fn with_store(
        config: &AppConfig,
        categories: Arc<dyn CategoryStore>,
        documents: DocumentRepo,
    ) -> Self {
        Self {
            categories,
            documents,
            uploads_dir: PathBuf::from(&config.uploads.dir),
            exclude: config.uploads.exclude.clone(),
            max_content_bytes: config.classification.max_content_bytes,
            workers: config.reclassify.workers,
        }
    }

    pub fn categories(&self) -> &dyn CategoryStore {
        self.categories.as_ref()
    }

    pub fn documents(&self) -> &DocumentRepo {
        &self.documents
    }

    /// Classifies a file without storing anything.
    pub async fn classify_path(&self, path: &Path, filename: &str) -> Result<Classification> {
        let snapshot = self.categories.fetch_all().await?;
        Ok(classifier::classify_file(
            &snapshot,
            path,
            filename,
            self.max_content_bytes,
        ))
    }

    /// Stores `source` in the uploads directory, classifies it and records
    /// it as a draft. `display_name` defaults to the source file name.
    pub async fn upload(&self, source: &Path, display_name: Option<&str>) -> Result<UploadOutcome> {
        let filename = match display_name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| anyhow::anyhow!("{:?} has no file name", source))?,
        };

        // Fetch first: without categories nothing should be stored.
        let snapshot = self.categories.fetch_all().await?;
        let stored = ingest::store_file(&self.uploads_dir, source, &filename)?;

        let classification = classifier::classify_file(
            &snapshot,
            &stored.path,
            &filename,
            self.max_content_bytes,
        );

        let record = NewDocument {
            filename: filename.clone(),
            path: stored.path.clone(),
            category: classification.category.clone(),
            file_size: stored.size,
            mime_type: stored.mime_type,
            content_hash: Some(stored.hash),
        };
        let document = match self.documents.insert(record).await {
            Ok(doc) => doc,
            Err(err) => {
                // A reused file belongs to an earlier document.
                if stored.created {
                    if let Err(rm) = std::fs::remove_file(&stored.path) {
                        warn!("could not remove {:?} after failed insert: {}", stored.path, rm);
                    }
                }
                return Err(err);
            }
        };
        info!(
            "uploaded '{}' as document {} in '{}'",
            filename, document.id, document.category
        );
        Ok(UploadOutcome {
            document,
            warning: classification.warning,
        })
    }

    /// Uploads every file under `root`. The category store must be
    /// reachable; other per-file failures are logged and counted.
    pub async fn import_dir(&self, root: &Path, extra_excludes: &[String]) -> Result<ImportSummary> {
        let mut excludes = self.exclude.clone();
        excludes.extend(extra_excludes.iter().cloned());
        let files = scanner::collect_files(root, &excludes)?;
        let mut summary = ImportSummary {
            discovered: files.len(),
            ..Default::default()
        };
        for path in files {
            match self.upload(&path, None).await {
                Ok(outcome) => {
                    summary.imported += 1;
                    if outcome.document.category == crate::models::UNASSIGNED {
                        summary.unassigned += 1;
                    }
                }
                Err(err @ DocflowError::StoreUnavailable(_)) => return Err(err),
                Err(err) => {
                    warn!("import of {:?} failed: {}", path, err);
                    summary.failed += 1;
                }
            }
        }
        info!(
            "import of {:?}: {} of {} files imported",
            root, summary.imported, summary.discovered
        );
        Ok(summary)
    }

    pub async fn reclassify(&self) -> Result<ReclassifySummary> {
        reclassify::reclassify_all(
            self.categories.as_ref(),
            &self.documents,
            self.max_content_bytes,
            self.workers,
        )
        .await
    }
}
