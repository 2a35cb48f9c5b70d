use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use cli::{categories, documents};
use docflow_core::config;
use docflow_core::keywords::CategoryDraft;
use docflow_core::pipeline::Library;
use docflow_core::DocumentStatus;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;
    tracing::debug!("database at {}, uploads in {}", cfg.database.path, cfg.uploads.dir);
    let library = Library::open(&cfg).await?;

    match cli.command {
        Commands::Category { command } => run_category(&library, command).await,
        Commands::Upload { file, name, json } => {
            let outcome = library.upload(&file, name.as_deref()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                println!(
                    "document {}: {} -> {}",
                    outcome.document.id, outcome.document.filename, outcome.document.category
                );
                if let Some(w) = outcome.warning {
                    println!("warning: {w}");
                }
            }
            Ok(())
        }
        Commands::Import { dir, exclude, json } => {
            let summary = library.import_dir(&dir, &exclude).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "import: discovered {}, imported {}, failed {}, unassigned {}",
                    summary.discovered, summary.imported, summary.failed, summary.unassigned
                );
            }
            Ok(())
        }
        Commands::Classify { file, name } => {
            let filename = name.unwrap_or_else(|| {
                file.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            });
            let outcome = library.classify_path(&file, &filename).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Commands::Documents { json } => {
            let docs = library.documents().list().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&docs)?);
            } else {
                print!("{}", documents::render(&docs));
            }
            Ok(())
        }
        Commands::Status { id, status } => {
            let status: DocumentStatus = status.parse()?;
            let doc = library.documents().set_status(id, status).await?;
            println!("document {}: {}", doc.id, doc.status);
            Ok(())
        }
        Commands::Remove { id } => {
            let doc = library.documents().delete(id).await?;
            println!("removed document {} ({})", doc.id, doc.filename);
            Ok(())
        }
        Commands::Export { id, dest } => {
            let written = library.documents().export(id, &dest).await?;
            println!("{}", written.display());
            Ok(())
        }
        Commands::Reclassify { json } => {
            let summary = library.reclassify().await.context("reclassify")?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "reclassify: {} documents, {} updated, {} unchanged, {} skipped, {} failed",
                    summary.total, summary.updated, summary.unchanged, summary.skipped, summary.failed
                );
            }
            Ok(())
        }
    }
}

async fn run_category(library: &Library, command: CategoryCommand) -> Result<()> {
    let store = library.categories();
    match command {
        CategoryCommand::Add {
            name,
            keywords,
            description,
        } => {
            let draft = CategoryDraft {
                name,
                keywords: categories::parse_keywords(&keywords),
                description: description.unwrap_or_default(),
            };
            let cat = store.create(&draft).await?;
            println!("category {}: {}", cat.id, cat.name);
        }
        CategoryCommand::List { json } => {
            let views = categories::list(store).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&views)?);
            } else {
                print!("{}", categories::render(&views));
            }
        }
        CategoryCommand::Update {
            id,
            name,
            keywords,
            description,
        } => {
            let draft = CategoryDraft {
                name,
                keywords: categories::parse_keywords(&keywords),
                description: description.unwrap_or_default(),
            };
            let cat = store.update(id, &draft).await?;
            println!("category {}: {}", cat.id, cat.name);
        }
        CategoryCommand::Remove { id } => {
            store.delete(id).await?;
            println!("removed category {id}");
        }
        CategoryCommand::Import { file } => {
            let (created, updated) = categories::import_file(store, &file).await?;
            println!("categories: {created} created, {updated} updated");
        }
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "docflow")]
#[command(about = "Document library with keyword classification", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage categories and their keywords
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },
    /// Store a file, classify it and record it as a draft
    Upload {
        file: PathBuf,
        /// Display name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Upload every file under a directory
    Import {
        dir: PathBuf,
        /// Extra glob patterns to skip (comma-separated)
        #[arg(long, value_delimiter = ',', num_args = 1.., default_values_t = Vec::<String>::new())]
        exclude: Vec<String>,
        /// Output JSON summary
        #[arg(long)]
        json: bool,
    },
    /// Show which category a file would land in without storing it
    Classify {
        file: PathBuf,
        /// Display name to classify (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
    },
    /// List documents, newest first
    Documents {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Move a document to a workflow status (draft|pending-review|approved|archived)
    Status { id: i64, status: String },
    /// Delete a document and its stored file
    Remove { id: i64 },
    /// Copy a stored document to a directory under its display name
    Export { id: i64, dest: PathBuf },
    /// Reclassify every stored document against the current categories
    Reclassify {
        /// Output JSON summary
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum CategoryCommand {
    /// Create a category
    Add {
        name: String,
        /// Comma-separated keywords
        #[arg(short, long)]
        keywords: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// List categories
    List {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Replace a category's name and keywords
    Update {
        id: i64,
        name: String,
        /// Comma-separated keywords
        #[arg(short, long)]
        keywords: String,
        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete a category
    Remove { id: i64 },
    /// Create or update categories from a TOML file
    Import { file: PathBuf },
}
