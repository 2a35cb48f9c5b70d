//! Core library: tokenization, keyword classification, category store and
//! the document library built on top of them.

pub mod classifier;
pub mod config;
pub mod documents;
pub mod error;
pub mod extractor;
pub mod ingest;
pub mod keywords;
pub mod models;
pub mod pipeline;
pub mod reclassify;
pub mod scanner;
pub mod store;
pub mod tokenizer;

pub use classifier::{classify, Classification};
pub use error::{DocflowError, Result};
pub use models::{Category, Document, DocumentStatus, UNASSIGNED};
