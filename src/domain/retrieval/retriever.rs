//! Retrieval capability trait

use async_trait::async_trait;

use super::Passage;
use crate::domain::DomainError;

/// Query handed to a retriever
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalQuery {
    /// Query text
    pub text: String,
    /// Maximum number of passages to return
    pub top_k: usize,
}

impl RetrievalQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            top_k: 10,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

/// Opaque, read-only search over already-indexed passages.
///
/// Implementations must tolerate concurrent calls; the QA core never mutates
/// or rebuilds a retriever it was handed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return passages for the query, best first. An empty list is not an error.
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<Passage>, DomainError>;

    /// Short name used in logs
    fn retriever_name(&self) -> &'static str;
}
