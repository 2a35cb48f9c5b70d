//! Category keyword model: how administrators describe a category and how
//! that input is cleaned before it reaches the store.

use crate::error::{DocflowError, Result};
use crate::tokenizer;
use serde::{Deserialize, Serialize};

/// Canonical form of a keyword: trimmed and lowercased.
pub fn normalize_keyword(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

/// Whether a normalized keyword is long enough to ever contribute to a
/// score.
pub fn is_scoring(keyword: &str) -> bool {
    tokenizer::is_significant(keyword)
}

/// Lowercases and trims every keyword and drops the empty ones. Order and
/// duplicates are kept.
pub fn clean_keywords<S: AsRef<str>>(keywords: &[S]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| normalize_keyword(k.as_ref()))
        .filter(|k| !k.is_empty())
        .collect()
}

/// Administrative input for creating or editing a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDraft {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl CategoryDraft {
    pub fn new(name: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the cleaned draft: trimmed name, normalized keywords.
    ///
    /// A category needs a name and at least one keyword left after
    /// cleaning. Keywords below the scoring threshold are accepted and
    /// stored, they just never count.
    pub fn validate(&self) -> Result<CategoryDraft> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DocflowError::InvalidCategory(
                "name must not be empty".to_string(),
            ));
        }
        let keywords = clean_keywords(self.keywords.as_slice());
        if keywords.is_empty() {
            return Err(DocflowError::InvalidCategory(format!(
                "category '{name}' needs at least one keyword"
            )));
        }
        Ok(CategoryDraft {
            name: name.to_string(),
            keywords,
            description: self.description.trim().to_string(),
        })
    }
}

/// Shape of a category import file:
///
/// ```toml
/// [[category]]
/// name = "Finance"
/// keywords = ["invoice", "payment"]
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CategoryFile {
    #[serde(default, rename = "category")]
    pub categories: Vec<CategoryDraft>,
}

pub fn parse_category_file(content: &str) -> anyhow::Result<Vec<CategoryDraft>> {
    let file: CategoryFile = toml::from_str(content)?;
    Ok(file.categories)
}
