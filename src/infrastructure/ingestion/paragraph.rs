//! Paragraph-based chunking strategy

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::DomainError;
use crate::domain::ingestion::{Chunk, ChunkingConfig, ChunkingStrategy};

static BLANK_LINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n").unwrap());

/// Chunking strategy that packs whole paragraphs up to the chunk size
#[derive(Debug, Clone, Default)]
pub struct ParagraphChunker;

impl ParagraphChunker {
    /// Create a new paragraph chunker
    pub fn new() -> Self {
        Self
    }

    fn split_paragraphs(text: &str) -> Vec<&str> {
        BLANK_LINE_RE
            .split(text)
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .collect()
    }

    /// Cut an oversized paragraph on character boundaries
    fn split_chars(paragraph: &str, size: usize) -> Vec<String> {
        let chars: Vec<char> = paragraph.chars().collect();
        chars.chunks(size).map(|c| c.iter().collect()).collect()
    }
}

impl ChunkingStrategy for ParagraphChunker {
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Result<Vec<Chunk>, DomainError> {
        config.validate()?;

        let mut pieces: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for paragraph in Self::split_paragraphs(content) {
            let len = paragraph.chars().count();

            if len > config.chunk_size {
                if !current.is_empty() {
                    pieces.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                pieces.extend(Self::split_chars(paragraph, config.chunk_size));
                continue;
            }

            if current.is_empty() {
                current.push_str(paragraph);
                current_len = len;
            } else if current_len + 2 + len <= config.chunk_size {
                current.push_str("\n\n");
                current.push_str(paragraph);
                current_len += 2 + len;
            } else {
                pieces.push(std::mem::replace(&mut current, paragraph.to_string()));
                current_len = len;
            }
        }

        if !current.is_empty() {
            pieces.push(current);
        }

        Ok(pieces
            .into_iter()
            .enumerate()
            .map(|(index, content)| Chunk::new(content, index))
            .collect())
    }

    fn name(&self) -> &'static str {
        "paragraph"
    }
}
