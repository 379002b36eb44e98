//! Source documents handed to the indexer

use std::collections::BTreeSet;

use sha2::{Digest, Sha256};

/// A plain-text document loaded for indexing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// File name, used as the passage source
    pub name: String,
    pub content: String,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Hex SHA-256 of the file name and content.
    ///
    /// The name is part of the hash because passage ids and sources are
    /// derived from it; a rename must rebuild the index.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.content.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn size(&self) -> usize {
        self.content.len()
    }
}

/// Hex SHA-256 of a piece of text
pub fn content_hash(text: &str) -> String {
    hex::encode(Sha256::digest(text.as_bytes()))
}

/// Order-independent fingerprint set for a batch of documents
pub fn fingerprint_set(documents: &[SourceDocument]) -> BTreeSet<String> {
    documents.iter().map(SourceDocument::fingerprint).collect()
}
