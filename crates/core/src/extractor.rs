//! Reads the optional text content of a stored document.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

/// Only plain-text files have their content scored.
pub fn is_plain_text(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("txt"))
        .unwrap_or(false)
}

/// Reads at most `max_bytes` from `path` as UTF-8.
///
/// When the limit cuts a multi-byte character in half the partial character
/// is dropped. Any other invalid UTF-8 is an `InvalidData` error.
pub fn read_text(path: &Path, max_bytes: usize) -> io::Result<String> {
    let file = fs::File::open(path)?;
    let mut buf = Vec::new();
    file.take(max_bytes as u64).read_to_end(&mut buf)?;
    let truncated = buf.len() == max_bytes;

    match String::from_utf8(buf) {
        Ok(text) => Ok(text),
        Err(err) => {
            let utf8 = err.utf8_error();
            if truncated && utf8.error_len().is_none() {
                let mut bytes = err.into_bytes();
                bytes.truncate(utf8.valid_up_to());
                // valid_up_to marks the end of the longest valid prefix.
                String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
            } else {
                Err(io::Error::new(io::ErrorKind::InvalidData, utf8))
            }
        }
    }
}

/// Best-effort MIME type: magic bytes first, extension second.
pub fn guess_mime(path: &Path) -> String {
    if let Ok(Some(kind)) = infer::get_from_path(path) {
        return kind.mime_type().to_string();
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| match ext.to_lowercase().as_str() {
            "txt" | "log" => "text/plain",
            "md" => "text/markdown",
            "csv" => "text/csv",
            "json" => "application/json",
            "pdf" => "application/pdf",
            "doc" => "application/msword",
            "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "xls" => "application/vnd.ms-excel",
            "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            _ => crate::models::DEFAULT_MIME,
        })
        .unwrap_or(crate::models::DEFAULT_MIME)
        .to_string()
}
