//! docqa - Document question answering
//!
//! Answers natural-language questions over uploaded plain-text documents:
//! - Relevance classification that fails closed
//! - Answer drafting grounded only in retrieved passages
//! - Verification of the draft with a bounded re-draft loop
//! - BM25 keyword retrieval, reciprocal-rank fusion, per-session registry

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
