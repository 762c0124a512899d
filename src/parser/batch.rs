// src/parser/batch.rs
//! Sequential batch processing of a resume directory.
//!
//! Files are processed one at a time, in lexical filename order, with a
//! pacing delay between model calls to stay under the remote API's rate
//! ceiling. A failure on one file becomes a failure entry in the results;
//! it never aborts the rest of the batch.

use std::path::Path;
use std::time::Duration;

use tokio::fs;
use tracing::{info, warn};

use crate::common::AppConfig;
use crate::extract;
use crate::parser::engine::{ParseOptions, ResumeParser};
use crate::parser::models::BatchOutcome;

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Failed to read directory {path}: {message}")]
    ReadDir { path: String, message: String },

    #[error("Failed to write results to {path}: {message}")]
    WriteResults { path: String, message: String },
}

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub parse: ParseOptions,
    /// Delay inserted between files (not after the last one).
    pub pacing: Duration,
    pub max_file_size: u64,
    pub extensions: Vec<String>,
}

impl BatchOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            parse: ParseOptions::from_config(config),
            pacing: config.pacing_interval(),
            max_file_size: config.max_file_size,
            extensions: config.supported_extensions.clone(),
        }
    }
}

/// Process every supported resume file in `dir`.
///
/// `progress` is called with `(index, total, filename)` before each file;
/// callers decide whether that means a progress bar, a log line, or
/// nothing. The returned outcomes are in processing (lexical) order.
pub async fn process_directory(
    parser: &ResumeParser,
    dir: &Path,
    options: &BatchOptions,
    mut progress: impl FnMut(usize, usize, &str),
) -> Result<Vec<BatchOutcome>, BatchError> {
    if !dir.is_dir() {
        return Err(BatchError::NotADirectory(dir.display().to_string()));
    }

    let files = collect_resume_files(dir, &options.extensions).await?;
    let total = files.len();
    info!(dir = %dir.display(), files = total, "Starting batch run");

    let mut outcomes = Vec::with_capacity(total);

    for (index, path) in files.iter().enumerate() {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        progress(index, total, &filename);

        let outcome = match extract::text_from_file(path, options.max_file_size).await {
            Ok(text) => match parser.parse_resume(&text, &options.parse).await {
                Ok(record) => BatchOutcome::parsed(filename.clone(), record),
                Err(e) => {
                    warn!(filename = %filename, error = %e, "Parse failed for batch item");
                    BatchOutcome::failed(filename.clone(), e.to_string())
                }
            },
            Err(e) => {
                warn!(filename = %filename, error = %e, "Extraction failed for batch item");
                BatchOutcome::failed(filename.clone(), e.to_string())
            }
        };
        outcomes.push(outcome);

        if index + 1 < total && !options.pacing.is_zero() {
            tokio::time::sleep(options.pacing).await;
        }
    }

    let failed = outcomes.iter().filter(|o| !o.success).count();
    info!(total = total, failed = failed, "Batch run complete");

    Ok(outcomes)
}

/// Write the aggregate results as a JSON array with 2-space indentation.
pub async fn write_results(path: &Path, outcomes: &[BatchOutcome]) -> Result<(), BatchError> {
    let json = serde_json::to_vec_pretty(outcomes).map_err(|e| BatchError::WriteResults {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    fs::write(path, json).await.map_err(|e| BatchError::WriteResults {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Supported files in the directory, sorted lexically by filename so runs
/// are deterministic.
async fn collect_resume_files(
    dir: &Path,
    extensions: &[String],
) -> Result<Vec<std::path::PathBuf>, BatchError> {
    let mut entries = fs::read_dir(dir).await.map_err(|e| BatchError::ReadDir {
        path: dir.display().to_string(),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| BatchError::ReadDir {
        path: dir.display().to_string(),
        message: e.to_string(),
    })? {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        let ext = extract::extension_of(&name);
        if extensions.iter().any(|e| e == &ext) {
            files.push(path);
        }
    }

    files.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
    Ok(files)
}
