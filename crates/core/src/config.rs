use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub uploads: UploadConfig,
    #[serde(default)]
    pub classification: ClassificationConfig,
    #[serde(default)]
    pub reclassify: ReclassifyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "data/docflow.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Directory stored document files are copied into.
    pub dir: String,
    /// Glob patterns skipped by directory import.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            dir: "data/uploads".to_string(),
            exclude: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationConfig {
    /// Upper bound on the bytes of text content read per document.
    pub max_content_bytes: usize,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            max_content_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReclassifyConfig {
    /// Blocking workers used by bulk reclassification.
    pub workers: usize,
}

impl Default for ReclassifyConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

/// Loads configuration from `path` (or the optional `config/default`) and
/// `DOCFLOW__SECTION__KEY` environment variables.
pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder();
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(
        config::Environment::with_prefix("DOCFLOW")
            .prefix_separator("__")
            .separator("__"),
    );
    let cfg = settings.build()?;
    Ok(cfg.try_deserialize()?)
}
