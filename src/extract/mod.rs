// src/extract/mod.rs
//! # Text Extraction
//!
//! Converts resume files into raw text by file extension:
//! - `.txt` / `.text`: read as UTF-8
//! - `.pdf`: text extraction via the pdf-extract crate
//! - `.docx`: paragraph text pulled out of `word/document.xml`
//!
//! Extraction is pure with respect to the rest of the system: it never
//! touches the cache or the model client.

mod docx;

use std::path::Path;

use tokio::fs;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("File too large: {size} bytes (limit is {limit})")]
    TooLarge { size: u64, limit: u64 },

    #[error("Failed to read file: {0}")]
    Read(String),
}

/// Extensions the extraction dispatch can actually handle.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "text", "pdf", "docx"];

/// Lowercased extension of a file name, or empty string when there is none.
pub fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Extract the textual content of a resume file on disk.
///
/// The size of the file is checked against `max_size` before any bytes are
/// read, so oversized files fail fast.
pub async fn text_from_file(path: &Path, max_size: u64) -> Result<String, ExtractError> {
    let metadata = fs::metadata(path)
        .await
        .map_err(|e| ExtractError::Read(format!("{}: {}", path.display(), e)))?;

    if metadata.len() > max_size {
        return Err(ExtractError::TooLarge {
            size: metadata.len(),
            limit: max_size,
        });
    }

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let bytes = fs::read(path)
        .await
        .map_err(|e| ExtractError::Read(format!("{}: {}", path.display(), e)))?;

    text_from_bytes(&filename, &bytes)
}

/// Extract text from an in-memory file, dispatching on the extension of
/// `filename`. Used directly by the upload handler.
pub fn text_from_bytes(filename: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let ext = extension_of(filename);
    debug!(filename = %filename, extension = %ext, size = bytes.len(), "Extracting text");

    match ext.as_str() {
        "txt" | "text" => String::from_utf8(bytes.to_vec())
            .map_err(|e| ExtractError::Read(format!("{} is not valid UTF-8: {}", filename, e))),
        "pdf" => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractError::Read(format!("PDF extraction failed: {}", e))),
        "docx" => docx::text_from_docx(bytes),
        "" => Err(ExtractError::UnsupportedFormat("(no extension)".to_string())),
        other => Err(ExtractError::UnsupportedFormat(format!(".{}", other))),
    }
}
