//! Public library modules for the CLI crate
pub mod categories;
pub mod documents;
