//! Document ingestion infrastructure
//!
//! Reads plain-text files, chunks them by paragraph and indexes the
//! resulting passages for keyword retrieval.

mod loader;
mod paragraph;

pub use loader::{DocumentIndexer, load_documents};
pub use paragraph::ParagraphChunker;
