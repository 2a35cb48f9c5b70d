use async_trait::async_trait;
use docflow_core::config::AppConfig;
use docflow_core::documents::DocumentRepo;
use docflow_core::keywords::CategoryDraft;
use docflow_core::pipeline::Library;
use docflow_core::store::CategoryStore;
use docflow_core::{Category, DocflowError, DocumentStatus, UNASSIGNED};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn test_config(temp: &TempDir) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.database.path = temp.path().join("db/docflow.db").to_string_lossy().into_owned();
    cfg.uploads.dir = temp.path().join("uploads").to_string_lossy().into_owned();
    cfg.reclassify.workers = 2;
    cfg
}

async fn open_library(temp: &TempDir) -> Library {
    Library::open(&test_config(temp)).await.unwrap()
}

async fn add(library: &Library, name: &str, keywords: &[&str]) -> Category {
    library
        .categories()
        .create(&CategoryDraft::new(name, keywords))
        .await
        .unwrap()
}

fn uploads_count(temp: &TempDir) -> usize {
    fs::read_dir(temp.path().join("uploads"))
        .map(|entries| entries.count())
        .unwrap_or(0)
}

#[tokio::test]
async fn upload_scores_filename_and_text_content() {
    let temp = tempfile::tempdir().unwrap();
    let library = open_library(&temp).await;
    add(&library, "Finance", &["invoice", "payment"]).await;

    let src = temp.path().join("invoice_march.txt");
    fs::write(&src, "payment due invoice").unwrap();

    let outcome = library.upload(&src, None).await.unwrap();
    let doc = outcome.document;
    assert_eq!(doc.filename, "invoice_march.txt");
    assert_eq!(doc.category, "Finance");
    assert_eq!(doc.status, DocumentStatus::Draft);
    assert_eq!(doc.file_size, 19);
    assert_eq!(doc.mime_type, "text/plain");
    assert!(doc.content_hash.is_some());
    assert!(outcome.warning.is_none());
    assert!(std::path::Path::new(&doc.path).starts_with(temp.path().join("uploads")));
    assert!(std::path::Path::new(&doc.path).exists());
}

#[tokio::test]
async fn upload_ignores_content_of_non_text_files() {
    let temp = tempfile::tempdir().unwrap();
    let library = open_library(&temp).await;
    add(&library, "X", &["budget"]).await;

    let src = temp.path().join("photo.jpg");
    fs::write(&src, "budget budget budget").unwrap();
    let outcome = library.upload(&src, None).await.unwrap();
    assert_eq!(outcome.document.category, UNASSIGNED);
}

#[tokio::test]
async fn upload_uses_display_name_for_tokens() {
    let temp = tempfile::tempdir().unwrap();
    let library = open_library(&temp).await;
    add(&library, "A", &["report"]).await;
    add(&library, "B", &["report"]).await;

    let src = temp.path().join("tmp-upload");
    fs::write(&src, [0u8, 1, 2]).unwrap();
    let outcome = library
        .upload(&src, Some("monthly_report.pdf"))
        .await
        .unwrap();
    assert_eq!(outcome.document.filename, "monthly_report.pdf");
    assert_eq!(outcome.document.category, "A");
}

#[tokio::test]
async fn undecodable_text_falls_back_to_filename_with_warning() {
    let temp = tempfile::tempdir().unwrap();
    let library = open_library(&temp).await;
    add(&library, "Finance", &["invoice"]).await;
    add(&library, "Legal", &["contract"]).await;

    let src = temp.path().join("invoice.txt");
    // "contract" twice, then an invalid byte.
    let mut bytes = b"contract contract ".to_vec();
    bytes.push(0xff);
    fs::write(&src, bytes).unwrap();

    let outcome = library.upload(&src, None).await.unwrap();
    assert_eq!(outcome.document.category, "Finance");
    assert!(outcome.warning.is_some());
}

#[tokio::test]
async fn classify_path_does_not_store_anything() {
    let temp = tempfile::tempdir().unwrap();
    let library = open_library(&temp).await;
    add(&library, "Finance", &["invoice"]).await;

    let src = temp.path().join("invoice.txt");
    fs::write(&src, "invoice").unwrap();
    let outcome = library.classify_path(&src, "invoice.txt").await.unwrap();
    assert_eq!(outcome.category, "Finance");
    assert_eq!(outcome.score, 4);
    assert!(library.documents().list().await.unwrap().is_empty());
    assert_eq!(uploads_count(&temp), 0);
}

#[tokio::test]
async fn reclassify_counts_updated_unchanged_and_skipped() {
    let temp = tempfile::tempdir().unwrap();
    let library = open_library(&temp).await;

    let mut ids = Vec::new();
    for (name, body) in [
        ("contract_draft.txt", "signed by both parties"),
        ("holiday.txt", "beach and sun"),
        ("contract_old.txt", "archived agreement"),
    ] {
        let src = temp.path().join(name);
        fs::write(&src, body).unwrap();
        let outcome = library.upload(&src, None).await.unwrap();
        assert_eq!(outcome.document.category, UNASSIGNED);
        ids.push(outcome.document);
    }

    add(&library, "Legal", &["contract"]).await;
    fs::remove_file(&ids[2].path).unwrap();

    let summary = library.reclassify().await.unwrap();
    assert_eq!(summary.total, 3);
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.unchanged, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.left_unchanged(), 2);

    let repo = library.documents();
    assert_eq!(repo.get(ids[0].id).await.unwrap().category, "Legal");
    assert_eq!(repo.get(ids[1].id).await.unwrap().category, UNASSIGNED);
    assert_eq!(repo.get(ids[2].id).await.unwrap().category, UNASSIGNED);

    let again = library.reclassify().await.unwrap();
    assert_eq!(again.updated, 0);
    assert_eq!(again.unchanged, 2);
}

#[tokio::test]
async fn reclassify_keeps_status() {
    let temp = tempfile::tempdir().unwrap();
    let library = open_library(&temp).await;
    let src = temp.path().join("budget_2024.txt");
    fs::write(&src, "numbers").unwrap();
    let doc = library.upload(&src, None).await.unwrap().document;
    library
        .documents()
        .set_status(doc.id, DocumentStatus::Approved)
        .await
        .unwrap();

    add(&library, "Planning", &["budget"]).await;
    library.reclassify().await.unwrap();

    let doc = library.documents().get(doc.id).await.unwrap();
    assert_eq!(doc.category, "Planning");
    assert_eq!(doc.status, DocumentStatus::Approved);
}

struct UnavailableStore;

#[async_trait]
impl CategoryStore for UnavailableStore {
    async fn fetch_all(&self) -> docflow_core::Result<Vec<Category>> {
        Err(DocflowError::StoreUnavailable(anyhow::anyhow!("connection refused")))
    }

    async fn create(&self, _draft: &CategoryDraft) -> docflow_core::Result<Category> {
        Err(DocflowError::StoreUnavailable(anyhow::anyhow!("connection refused")))
    }

    async fn update(&self, _id: i64, _draft: &CategoryDraft) -> docflow_core::Result<Category> {
        Err(DocflowError::StoreUnavailable(anyhow::anyhow!("connection refused")))
    }

    async fn delete(&self, _id: i64) -> docflow_core::Result<()> {
        Err(DocflowError::StoreUnavailable(anyhow::anyhow!("connection refused")))
    }
}

#[tokio::test]
async fn store_failure_is_an_error_not_unassigned() {
    let temp = tempfile::tempdir().unwrap();
    let cfg = test_config(&temp);
    let pool = storage::open(&cfg.database.path).await.unwrap();
    let library = Library::with_store(&cfg, Arc::new(UnavailableStore), DocumentRepo::new(pool));

    let src = temp.path().join("invoice.txt");
    fs::write(&src, "invoice").unwrap();

    let err = library.upload(&src, None).await.unwrap_err();
    assert!(matches!(err, DocflowError::StoreUnavailable(_)));
    assert!(library.documents().list().await.unwrap().is_empty());
    assert_eq!(uploads_count(&temp), 0);

    let err = library.classify_path(&src, "invoice.txt").await.unwrap_err();
    assert!(matches!(err, DocflowError::StoreUnavailable(_)));

    let err = library.reclassify().await.unwrap_err();
    assert!(matches!(err, DocflowError::StoreUnavailable(_)));

    let err = library.import_dir(temp.path(), &[]).await.unwrap_err();
    assert!(matches!(err, DocflowError::StoreUnavailable(_)));
}

#[tokio::test]
async fn import_dir_uploads_each_file() {
    let temp = tempfile::tempdir().unwrap();
    let library = open_library(&temp).await;
    add(&library, "Finance", &["invoice"]).await;

    let inbox = temp.path().join("inbox");
    fs::create_dir_all(inbox.join("nested")).unwrap();
    fs::write(inbox.join("invoice_01.txt"), "total").unwrap();
    fs::write(inbox.join("nested/notes.txt"), "misc").unwrap();
    fs::write(inbox.join("scratch.tmp"), "skip me").unwrap();
    fs::write(inbox.join(".DS_Store"), "hidden").unwrap();

    let summary = library
        .import_dir(&inbox, &["**/*.tmp".to_string()])
        .await
        .unwrap();
    assert_eq!(summary.discovered, 2);
    assert_eq!(summary.imported, 2);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.unassigned, 1);
    assert_eq!(library.documents().list().await.unwrap().len(), 2);
}

#[tokio::test]
async fn remove_deletes_stored_file() {
    let temp = tempfile::tempdir().unwrap();
    let library = open_library(&temp).await;
    let src = temp.path().join("a.txt");
    fs::write(&src, "words").unwrap();
    let doc = library.upload(&src, None).await.unwrap().document;

    library.documents().delete(doc.id).await.unwrap();
    assert!(!std::path::Path::new(&doc.path).exists());
    assert!(src.exists());
    assert!(matches!(
        library.documents().delete(doc.id).await,
        Err(DocflowError::DocumentNotFound(_))
    ));
}

#[tokio::test]
async fn failed_insert_keeps_file_shared_with_earlier_document() {
    let temp = tempfile::tempdir().unwrap();
    let cfg = test_config(&temp);
    let library = Library::open(&cfg).await.unwrap();

    let a = temp.path().join("a.txt");
    fs::write(&a, "shared bytes").unwrap();
    let first = library.upload(&a, None).await.unwrap().document;

    let pool = storage::open(&cfg.database.path).await.unwrap();
    reject_document_inserts(&pool).await;

    let b = temp.path().join("b.txt");
    fs::write(&b, "shared bytes").unwrap();
    assert!(library.upload(&b, None).await.is_err());
    assert!(std::path::Path::new(&first.path).exists());

    // A file created by the failed upload itself is cleaned up.
    let c = temp.path().join("c.txt");
    fs::write(&c, "fresh bytes").unwrap();
    assert!(library.upload(&c, None).await.is_err());
    assert_eq!(uploads_count(&temp), 1);
}

async fn reject_document_inserts(pool: &sqlx::SqlitePool) {
    sqlx::query(
        "CREATE TRIGGER reject_documents BEFORE INSERT ON documents BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
    )
    .execute(pool)
    .await
    .unwrap();
}

#[tokio::test]
async fn reclassify_counts_filename_only_documents() {
    let temp = tempfile::tempdir().unwrap();
    let library = open_library(&temp).await;

    let broken = temp.path().join("invoice_scan.txt");
    let mut bytes = b"contract ".to_vec();
    bytes.extend_from_slice(&[0xff, 0xfe]);
    fs::write(&broken, bytes).unwrap();
    let broken_doc = library.upload(&broken, None).await.unwrap();
    assert!(broken_doc.warning.is_some());

    let readable = temp.path().join("invoice_copy.txt");
    fs::write(&readable, "paid in full").unwrap();
    library.upload(&readable, None).await.unwrap();

    // Legal would win the tie if the undecodable content were scored.
    add(&library, "Legal", &["contract"]).await;
    add(&library, "Finance", &["invoice"]).await;

    let summary = library.reclassify().await.unwrap();
    assert_eq!(summary.total, 2);
    assert_eq!(summary.updated, 2);
    assert_eq!(summary.warnings, 1);
    assert_eq!(summary.failed, 0);

    let doc = library.documents().get(broken_doc.document.id).await.unwrap();
    assert_eq!(doc.category, "Finance");
}
