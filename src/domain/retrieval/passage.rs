//! Retrieved text passages

use serde::{Deserialize, Serialize};

/// A unit of retrieved text used as grounding evidence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// Identifier of the chunk, unique within its retriever
    pub id: String,
    /// Passage text
    pub content: String,
    /// Retrieval score; only comparable within one result list
    #[serde(default)]
    pub score: f32,
    /// Source document reference (file name)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Passage {
    /// Create a new passage
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            score: 0.0,
            source: None,
        }
    }

    /// Set the retrieval score
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }

    /// Set the source reference
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Join passage texts into one context block, separated by blank lines.
///
/// `limit` keeps only the first `limit` passages; `None` joins them all.
pub fn join_passages(passages: &[Passage], limit: Option<usize>) -> String {
    let take = limit.unwrap_or(passages.len());

    passages
        .iter()
        .take(take)
        .map(|p| p.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
