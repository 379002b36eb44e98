//! Ingestion domain - plain-text source documents and chunking

mod chunker;
mod document;
mod validation;

pub use chunker::{Chunk, ChunkingConfig, ChunkingStrategy};
pub use document::{SourceDocument, content_hash, fingerprint_set};
pub use validation::{
    ALLOWED_EXTENSIONS, DocumentKind, MAX_FILE_SIZE, MAX_TOTAL_SIZE, detect_kind_from_filename,
    validate_batch_sizes, validate_file_size,
};
