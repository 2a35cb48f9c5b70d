//! Bulk reclassification of every stored document against one category
//! snapshot.

use crate::classifier::{self, Classification};
use crate::documents::DocumentRepo;
use crate::error::Result;
use crate::models::{Category, Document};
use crate::store::CategoryStore;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReclassifySummary {
    pub total: usize,
    /// Category changed and was saved.
    pub updated: usize,
    /// Classified to the category it already had.
    pub unchanged: usize,
    /// Stored file no longer exists.
    pub skipped: usize,
    /// Classification or the save failed.
    pub failed: usize,
    /// Documents classified from their filename only.
    pub warnings: usize,
}

impl ReclassifySummary {
    /// Documents whose category was left as it was, for whatever reason.
    pub fn left_unchanged(&self) -> usize {
        self.unchanged + self.skipped + self.failed
    }
}

/// Reclassifies every document. The category snapshot is fetched once; a
/// store failure aborts before any document is touched. Individual document
/// failures are logged and counted.
pub async fn reclassify_all(
    store: &dyn CategoryStore,
    repo: &DocumentRepo,
    max_content_bytes: usize,
    workers: usize,
) -> Result<ReclassifySummary> {
    let snapshot: Arc<[Category]> = store.fetch_all().await?.into();
    let documents = repo.list().await?;
    let mut summary = ReclassifySummary {
        total: documents.len(),
        ..Default::default()
    };
    info!(
        "reclassifying {} documents against {} categories",
        documents.len(),
        snapshot.len()
    );

    let permits = Arc::new(Semaphore::new(workers.max(1)));
    let mut tasks: JoinSet<(Document, Outcome)> = JoinSet::new();
    for doc in documents {
        let snapshot = Arc::clone(&snapshot);
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            // The semaphore is never closed, so acquiring only waits.
            let _permit = permits.acquire_owned().await.ok();
            let path = PathBuf::from(&doc.path);
            let filename = doc.filename.clone();
            let job = tokio::task::spawn_blocking(move || {
                if !path.exists() {
                    return Outcome::Missing;
                }
                Outcome::Classified(classifier::classify_file(
                    &snapshot,
                    &path,
                    &filename,
                    max_content_bytes,
                ))
            });
            let outcome = job
                .await
                .unwrap_or_else(|err| Outcome::Failed(err.to_string()));
            (doc, outcome)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (doc, outcome) = match joined {
            Ok(pair) => pair,
            Err(err) => {
                warn!("reclassify worker failed: {}", err);
                summary.failed += 1;
                continue;
            }
        };
        let outcome = match outcome {
            Outcome::Classified(outcome) => outcome,
            Outcome::Missing => {
                warn!("document {} skipped: stored file {} missing", doc.id, doc.path);
                summary.skipped += 1;
                continue;
            }
            Outcome::Failed(err) => {
                warn!("document {} could not be classified: {}", doc.id, err);
                summary.failed += 1;
                continue;
            }
        };
        if outcome.warning.is_some() {
            summary.warnings += 1;
        }
        if outcome.category == doc.category {
            summary.unchanged += 1;
            continue;
        }
        match repo.set_category(doc.id, &outcome.category).await {
            Ok(()) => {
                info!(
                    "document {} ({}) moved from '{}' to '{}'",
                    doc.id, doc.filename, doc.category, outcome.category
                );
                summary.updated += 1;
            }
            Err(err) => {
                warn!("document {} could not be updated: {}", doc.id, err);
                summary.failed += 1;
            }
        }
    }

    info!(
        "reclassify complete: {} updated, {} unchanged, {} skipped, {} failed",
        summary.updated, summary.unchanged, summary.skipped, summary.failed
    );
    Ok(summary)
}

enum Outcome {
    Classified(Classification),
    Missing,
    Failed(String),
}
