//! Retrieval domain - passages and the retrieval capability consumed by the QA core

mod passage;
mod retriever;

pub use passage::{Passage, join_passages};
pub use retriever::{RetrievalQuery, Retriever};

#[cfg(test)]
pub use retriever::MockRetriever;
