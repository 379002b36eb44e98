//! Validation helpers for ingestion

use crate::domain::DomainError;

/// Maximum size of a single file (50 MiB)
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Maximum size of all files in one batch (200 MiB)
pub const MAX_TOTAL_SIZE: u64 = 200 * 1024 * 1024;

/// Extensions accepted for indexing
pub const ALLOWED_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// Kinds of plain-text documents the loader reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    PlainText,
    Markdown,
}

/// Detect document kind from filename extension.
///
/// Formats that need a real parser (PDF, DOCX) are rejected.
pub fn detect_kind_from_filename(filename: &str) -> Result<DocumentKind, DomainError> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "txt" => Ok(DocumentKind::PlainText),
        "md" => Ok(DocumentKind::Markdown),
        _ => Err(DomainError::unsupported_document(format!(
            "Unsupported file type: {} (allowed: {})",
            filename,
            ALLOWED_EXTENSIONS
                .iter()
                .map(|e| format!(".{}", e))
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

/// Validate a single file size
pub fn validate_file_size(filename: &str, size: u64) -> Result<(), DomainError> {
    if size > MAX_FILE_SIZE {
        return Err(DomainError::validation(format!(
            "File {} is {} bytes; the limit is {} bytes",
            filename, size, MAX_FILE_SIZE
        )));
    }

    Ok(())
}

/// Validate the sizes of a batch of files
pub fn validate_batch_sizes<'a, I>(files: I) -> Result<(), DomainError>
where
    I: IntoIterator<Item = (&'a str, u64)>,
{
    let mut total: u64 = 0;

    for (name, size) in files {
        validate_file_size(name, size)?;
        total = total.saturating_add(size);
    }

    if total > MAX_TOTAL_SIZE {
        return Err(DomainError::validation(format!(
            "Documents total {} bytes; the limit is {} bytes",
            total, MAX_TOTAL_SIZE
        )));
    }

    Ok(())
}
