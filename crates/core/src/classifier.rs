//! Keyword classifier: picks the category whose keywords best match the
//! tokens of a document's filename and, for plain-text files, its content.

use crate::extractor;
use crate::keywords::{is_scoring, normalize_keyword};
use crate::models::{Category, UNASSIGNED};
use crate::tokenizer::normalize;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

/// Points for a token equal to a keyword.
pub const EXACT_MATCH_WEIGHT: u64 = 2;
/// Points for a token containing a keyword without being equal to it.
pub const PARTIAL_MATCH_WEIGHT: u64 = 1;

/// Tokens of the filename followed by the tokens of the content.
pub fn document_tokens(filename: &str, content: Option<&str>) -> Vec<String> {
    let mut tokens = normalize(filename);
    if let Some(text) = content {
        tokens.extend(normalize(text));
    }
    tokens
}

/// Sums exact and partial matches over every (keyword, token) pair.
pub fn score_category(category: &Category, tokens: &[String]) -> u64 {
    let mut score = 0;
    for keyword in &category.keywords {
        let kw = normalize_keyword(keyword);
        if !is_scoring(&kw) {
            continue;
        }
        for token in tokens {
            if *token == kw {
                score += EXACT_MATCH_WEIGHT;
            } else if token.contains(kw.as_str()) {
                score += PARTIAL_MATCH_WEIGHT;
            }
        }
    }
    score
}

/// Best category for the given tokens as `(name, score)`.
///
/// Only a strictly higher score displaces the current leader, so the
/// earliest category in `categories` wins a tie.
pub fn best_match<'a>(categories: &'a [Category], tokens: &[String]) -> (&'a str, u64) {
    let mut best: (&'a str, u64) = (UNASSIGNED, 0);
    for category in categories {
        let score = score_category(category, tokens);
        if score > best.1 {
            best = (category.name.as_str(), score);
        }
    }
    best
}

/// Category name for a document, or [`UNASSIGNED`] when nothing scores.
pub fn classify(categories: &[Category], filename: &str, content: Option<&str>) -> String {
    let tokens = document_tokens(filename, content);
    best_match(categories, &tokens).0.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: String,
    pub score: u64,
    /// Set when the content could not be read and only the filename was
    /// scored.
    pub warning: Option<String>,
}

impl Classification {
    pub fn is_assigned(&self) -> bool {
        self.category != UNASSIGNED
    }
}

/// Classifies a stored file. Content of plain-text files is read up to
/// `max_content_bytes`; a failed read falls back to the filename alone and
/// is reported in [`Classification::warning`].
pub fn classify_file(
    categories: &[Category],
    path: &Path,
    filename: &str,
    max_content_bytes: usize,
) -> Classification {
    let mut warning = None;
    let content = if extractor::is_plain_text(path) {
        match extractor::read_text(path, max_content_bytes) {
            Ok(text) => Some(text),
            Err(err) => {
                warn!("content of {:?} unreadable, using filename only: {}", path, err);
                warning = Some(format!("content unreadable: {err}"));
                None
            }
        }
    } else {
        None
    };

    let tokens = document_tokens(filename, content.as_deref());
    let (name, score) = best_match(categories, &tokens);
    debug!(filename, category = name, score, tokens = tokens.len(), "classified");
    Classification {
        category: name.to_string(),
        score,
        warning,
    }
}
