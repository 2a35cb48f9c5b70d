use chrono::{DateTime, Utc};
use docflow_core::Document;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DocumentView {
    pub id: i64,
    pub filename: String,
    pub category: String,
    pub status: String,
    pub size: u64,
    pub mime: String,
    pub created: String,
}

impl From<&Document> for DocumentView {
    fn from(d: &Document) -> Self {
        Self {
            id: d.id,
            filename: d.filename.clone(),
            category: d.category.clone(),
            status: d.status.to_string(),
            size: d.file_size,
            mime: d.mime_type.clone(),
            created: format_timestamp(d.created_at),
        }
    }
}

pub fn format_timestamp(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ts.to_string())
}

pub fn render(docs: &[Document]) -> String {
    let mut out = String::new();
    for d in docs.iter().map(DocumentView::from) {
        out.push_str(&format!(
            "{:>4}  {:<16} {:<15} {:<32} {}\n",
            d.id, d.created, d.status, d.category, d.filename
        ));
    }
    out
}
