//! Text normalization shared by filenames and document content.

use once_cell::sync::Lazy;
use regex::Regex;

/// Words shorter than this many characters are treated as noise.
pub const MIN_TOKEN_LEN: usize = 4;

/// Anything outside the Unicode letter (L*) and number (N*) categories.
/// Combining marks and symbols count as separators.
static SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\p{L}\p{N}]+").expect("separator pattern is valid")
});

/// Lowercases `text`, turns everything that is not a letter or digit into
/// whitespace and keeps the words of at least [`MIN_TOKEN_LEN`] characters.
///
/// Order and duplicates are preserved: a word seen three times yields three
/// tokens.
pub fn normalize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = SEPARATOR.replace_all(&lowered, " ");

    cleaned
        .split_whitespace()
        .filter(|word| is_significant(word))
        .map(str::to_string)
        .collect()
}

/// Length check in Unicode scalar values, not bytes, so non-Latin words are
/// measured the same way as ASCII ones. A letter outside the Basic
/// Multilingual Plane counts once here, where a UTF-16 length would count
/// it twice.
pub fn is_significant(word: &str) -> bool {
    word.chars().count() >= MIN_TOKEN_LEN
}
