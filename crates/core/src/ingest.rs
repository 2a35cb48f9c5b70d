//! Copies uploaded files into the uploads directory under a
//! content-addressed name.

use crate::extractor;
use anyhow::Context;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub path: PathBuf,
    pub size: u64,
    pub mime_type: String,
    pub hash: String,
    /// False when identical content was already stored at `path`.
    pub created: bool,
}

/// Copies `source` to `<uploads_dir>/<blake3>.<ext>`. The extension of the
/// display name is kept so the stored file is still recognisable as text.
/// Identical content already in place is reused rather than copied again.
pub fn store_file(uploads_dir: &Path, source: &Path, display_name: &str) -> anyhow::Result<StoredFile> {
    fs::create_dir_all(uploads_dir)
        .with_context(|| format!("create uploads dir {:?}", uploads_dir))?;
    let hash = full_hash(source).with_context(|| format!("hash {:?}", source))?;
    let file_name = match Path::new(display_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
    {
        Some(ext) => format!("{}.{}", hash, ext.to_lowercase()),
        None => hash.clone(),
    };
    let dest = uploads_dir.join(file_name);
    let created = !dest.exists();
    let size = if created {
        fs::copy(source, &dest).with_context(|| format!("copy {:?} to {:?}", source, dest))?
    } else {
        fs::metadata(&dest)
            .with_context(|| format!("stat {:?}", dest))?
            .len()
    };
    Ok(StoredFile {
        mime_type: extractor::guess_mime(&dest),
        path: dest,
        size,
        hash,
        created,
    })
}

fn full_hash(path: &Path) -> anyhow::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}
