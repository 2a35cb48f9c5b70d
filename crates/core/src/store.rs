//! Category store: where the classifier's category snapshot comes from.

use crate::error::{DocflowError, Result};
use crate::keywords::CategoryDraft;
use crate::models::Category;
use anyhow::Context;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Mutex;
use storage::models::CategoryRow;
use tracing::info;

#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// Every category in insertion order. A failure here is reported as
    /// [`DocflowError::StoreUnavailable`].
    async fn fetch_all(&self) -> Result<Vec<Category>>;

    async fn create(&self, draft: &CategoryDraft) -> Result<Category>;

    async fn update(&self, id: i64, draft: &CategoryDraft) -> Result<Category>;

    async fn delete(&self, id: i64) -> Result<()>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>> {
        let name = name.trim();
        Ok(self.fetch_all().await?.into_iter().find(|c| c.name == name))
    }
}

/// Creates new categories and updates the ones whose name already exists.
/// Returns `(created, updated)`.
pub async fn upsert_all(
    store: &dyn CategoryStore,
    drafts: &[CategoryDraft],
) -> Result<(usize, usize)> {
    let mut created = 0;
    let mut updated = 0;
    for draft in drafts {
        let clean = draft.validate()?;
        match store.find_by_name(&clean.name).await? {
            Some(existing) => {
                store.update(existing.id, &clean).await?;
                updated += 1;
            }
            None => {
                store.create(&clean).await?;
                created += 1;
            }
        }
    }
    info!("category import: {} created, {} updated", created, updated);
    Ok((created, updated))
}

pub struct SqliteCategoryStore {
    pool: SqlitePool,
}

impl SqliteCategoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn get(&self, id: i64) -> Result<Category> {
        let row = sqlx::query_as::<_, CategoryRow>("SELECT * FROM categories WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("load category")?
            .ok_or(DocflowError::CategoryNotFound(id))?;
        decode_row(row)
    }

    async fn name_taken(&self, name: &str, except: Option<i64>) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM categories WHERE name = ?1 AND id != COALESCE(?2, -1)",
        )
        .bind(name)
        .bind(except)
        .fetch_one(&self.pool)
        .await
        .context("check category name")?;
        Ok(count > 0)
    }
}

fn decode_row(row: CategoryRow) -> Result<Category> {
    let name = row.name.clone();
    Category::try_from(row)
        .with_context(|| format!("malformed keywords for category '{name}'"))
        .map_err(DocflowError::from)
}

#[async_trait]
impl CategoryStore for SqliteCategoryStore {
    async fn fetch_all(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>("SELECT * FROM categories ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DocflowError::StoreUnavailable(e.into()))?;
        rows.into_iter()
            .map(|row| {
                let name = row.name.clone();
                Category::try_from(row).map_err(|e| {
                    DocflowError::StoreUnavailable(
                        anyhow::Error::new(e).context(format!("category '{name}'")),
                    )
                })
            })
            .collect()
    }

    async fn create(&self, draft: &CategoryDraft) -> Result<Category> {
        let clean = draft.validate()?;
        if self.name_taken(&clean.name, None).await? {
            return Err(DocflowError::DuplicateCategory(clean.name));
        }
        let keywords_json = serde_json::to_string(&clean.keywords).context("encode keywords")?;
        let id = sqlx::query(
            "INSERT INTO categories (name, keywords_json, description, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&clean.name)
        .bind(keywords_json)
        .bind(&clean.description)
        .bind(chrono::Utc::now().timestamp())
        .execute(&self.pool)
        .await
        .context("insert category")?
        .last_insert_rowid();
        info!("created category '{}' ({} keywords)", clean.name, clean.keywords.len());
        self.get(id).await
    }

    async fn update(&self, id: i64, draft: &CategoryDraft) -> Result<Category> {
        let clean = draft.validate()?;
        if self.name_taken(&clean.name, Some(id)).await? {
            return Err(DocflowError::DuplicateCategory(clean.name));
        }
        let keywords_json = serde_json::to_string(&clean.keywords).context("encode keywords")?;
        let res = sqlx::query(
            "UPDATE categories SET name = ?1, keywords_json = ?2, description = ?3 WHERE id = ?4",
        )
        .bind(&clean.name)
        .bind(keywords_json)
        .bind(&clean.description)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("update category")?;
        if res.rows_affected() == 0 {
            return Err(DocflowError::CategoryNotFound(id));
        }
        self.get(id).await
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("delete category")?;
        if res.rows_affected() == 0 {
            return Err(DocflowError::CategoryNotFound(id));
        }
        Ok(())
    }
}

/// Category store kept in memory.
#[derive(Default)]
pub struct MemoryCategoryStore {
    inner: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    categories: Vec<Category>,
}

impl MemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CategoryStore for MemoryCategoryStore {
    async fn fetch_all(&self) -> Result<Vec<Category>> {
        Ok(self.state().categories.clone())
    }

    async fn create(&self, draft: &CategoryDraft) -> Result<Category> {
        let clean = draft.validate()?;
        let mut state = self.state();
        if state.categories.iter().any(|c| c.name == clean.name) {
            return Err(DocflowError::DuplicateCategory(clean.name));
        }
        state.next_id += 1;
        let category = Category {
            id: state.next_id,
            name: clean.name,
            keywords: clean.keywords,
            description: clean.description,
            created_at: chrono::Utc::now().timestamp(),
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn update(&self, id: i64, draft: &CategoryDraft) -> Result<Category> {
        let clean = draft.validate()?;
        let mut state = self.state();
        if state
            .categories
            .iter()
            .any(|c| c.name == clean.name && c.id != id)
        {
            return Err(DocflowError::DuplicateCategory(clean.name));
        }
        let category = state
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(DocflowError::CategoryNotFound(id))?;
        category.name = clean.name;
        category.keywords = clean.keywords;
        category.description = clean.description;
        Ok(category.clone())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut state = self.state();
        let before = state.categories.len();
        state.categories.retain(|c| c.id != id);
        if state.categories.len() == before {
            return Err(DocflowError::CategoryNotFound(id));
        }
        Ok(())
    }
}
