//! Loads plain-text files and turns them into indexed passages

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::paragraph::ParagraphChunker;
use crate::domain::DomainError;
use crate::domain::ingestion::{
    ChunkingConfig, ChunkingStrategy, SourceDocument, content_hash, detect_kind_from_filename,
    validate_batch_sizes,
};
use crate::domain::retrieval::Passage;
use crate::infrastructure::retrieval::KeywordRetriever;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read a batch of `.txt`/`.md` files after checking types and sizes.
///
/// Nothing is read when any file in the batch is rejected.
pub async fn load_documents(paths: &[PathBuf]) -> Result<Vec<SourceDocument>, DomainError> {
    if paths.is_empty() {
        return Err(DomainError::validation("No documents given"));
    }

    let mut sized = Vec::with_capacity(paths.len());
    for path in paths {
        let name = file_name(path);
        detect_kind_from_filename(&name)?;

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| DomainError::io(format!("{}: {}", path.display(), e)))?;
        sized.push((name, metadata.len()));
    }

    validate_batch_sizes(sized.iter().map(|(name, size)| (name.as_str(), *size)))?;

    let mut documents = Vec::with_capacity(paths.len());
    for (path, (name, size)) in paths.iter().zip(sized) {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DomainError::io(format!("{}: {}", path.display(), e)))?;

        let content = String::from_utf8(bytes).map_err(|_| {
            DomainError::unsupported_document(format!("{} is not valid UTF-8 text", name))
        })?;

        debug!(document = %name, bytes = size, "Loaded document");
        documents.push(SourceDocument::new(name, content));
    }

    Ok(documents)
}

/// Chunks documents into passages and builds the keyword index
#[derive(Debug, Clone, Default)]
pub struct DocumentIndexer {
    chunker: ParagraphChunker,
    config: ChunkingConfig,
}

impl DocumentIndexer {
    pub fn new(config: ChunkingConfig) -> Self {
        Self {
            chunker: ParagraphChunker::new(),
            config,
        }
    }

    /// Passage ids are `<file>#<index>`.
    ///
    /// A chunk whose text already appeared earlier in the batch, in the same
    /// file or another one, is dropped; the first occurrence keeps its id.
    pub fn passages(&self, documents: &[SourceDocument]) -> Result<Vec<Passage>, DomainError> {
        let mut passages = Vec::new();
        let mut seen = HashSet::new();
        let mut duplicates = 0usize;

        for document in documents {
            for chunk in self.chunker.chunk(&document.content, &self.config)? {
                if !seen.insert(content_hash(&chunk.content)) {
                    duplicates += 1;
                    continue;
                }

                passages.push(
                    Passage::new(format!("{}#{}", document.name, chunk.index), chunk.content)
                        .with_source(document.name.clone()),
                );
            }
        }

        if duplicates > 0 {
            debug!(duplicates, unique = passages.len(), "Dropped duplicate chunks");
        }

        Ok(passages)
    }

    pub fn build_keyword_retriever(
        &self,
        documents: &[SourceDocument],
    ) -> Result<KeywordRetriever, DomainError> {
        let passages = self.passages(documents)?;

        info!(
            documents = documents.len(),
            passages = passages.len(),
            chunker = self.chunker.name(),
            chunk_size = self.config.chunk_size,
            "Built keyword index"
        );

        Ok(KeywordRetriever::new(passages))
    }
}
