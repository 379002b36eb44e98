//! Infrastructure layer - External service implementations

pub mod ingestion;
pub mod llm;
pub mod logging;
pub mod observability;
pub mod qa;
pub mod retrieval;
