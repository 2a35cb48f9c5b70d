use anyhow::{Context, Result};
use docflow_core::keywords::{self, CategoryDraft};
use docflow_core::store::{upsert_all, CategoryStore};
use docflow_core::Category;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct CategoryView {
    pub id: i64,
    pub name: String,
    pub keywords: Vec<String>,
    pub description: String,
    /// Keywords too short to ever score.
    pub inert_keywords: Vec<String>,
}

impl From<Category> for CategoryView {
    fn from(c: Category) -> Self {
        let inert_keywords = c
            .keywords
            .iter()
            .filter(|k| !keywords::is_scoring(k))
            .cloned()
            .collect();
        Self {
            id: c.id,
            name: c.name,
            keywords: c.keywords,
            description: c.description,
            inert_keywords,
        }
    }
}

/// Splits a comma-separated keyword argument.
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',').map(|k| k.to_string()).collect()
}

pub async fn list(store: &dyn CategoryStore) -> Result<Vec<CategoryView>> {
    Ok(store
        .fetch_all()
        .await?
        .into_iter()
        .map(CategoryView::from)
        .collect())
}

/// Creates or updates the categories described in a TOML file.
pub async fn import_file(store: &dyn CategoryStore, path: &Path) -> Result<(usize, usize)> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let drafts: Vec<CategoryDraft> = keywords::parse_category_file(&content)
        .with_context(|| format!("parse {}", path.display()))?;
    Ok(upsert_all(store, &drafts).await?)
}

pub fn render(views: &[CategoryView]) -> String {
    let mut out = String::new();
    for v in views {
        out.push_str(&format!("{:>4}  {:<20} {}", v.id, v.name, v.keywords.join(", ")));
        if !v.inert_keywords.is_empty() {
            out.push_str(&format!("  (never scored: {})", v.inert_keywords.join(", ")));
        }
        out.push('\n');
    }
    out
}
