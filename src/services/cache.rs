// src/services/cache.rs
//! Content-hash result cache.
//!
//! Parsed records are stored one pretty-printed JSON file per key under a
//! root directory, keyed by the SHA-256 of the exact resume text bytes.
//! There is no eviction, TTL, or size cap; the directory grows until
//! externally cleaned. The `RecordCache` trait is the seam where a bounded
//! store could be substituted without touching the parsing engine.

use std::path::PathBuf;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, warn};

use crate::parser::models::ResumeRecord;

/// Cache key for a resume text: hex SHA-256 of the raw bytes.
///
/// The text is deliberately not normalized first: whitespace or case
/// differences are different inputs and get different keys.
pub fn content_key(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Storage for previously parsed records.
///
/// `get` must only ever return what a previous successful parse stored;
/// failures on either operation degrade to a miss or a dropped write,
/// never an error for the caller.
#[async_trait]
pub trait RecordCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<ResumeRecord>;
    async fn put(&self, key: &str, record: &ResumeRecord);
}

/// Flat-directory cache: one `<key>.json` file per entry.
#[derive(Debug, Clone)]
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

#[async_trait]
impl RecordCache for FileCache {
    async fn get(&self, key: &str) -> Option<ResumeRecord> {
        let path = self.entry_path(key);
        let raw = match fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read cache entry");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(record) => {
                debug!(key = %key, "Cache hit");
                Some(record)
            }
            Err(e) => {
                // a corrupt entry is a miss, not a failure
                warn!(key = %key, error = %e, "Discarding corrupt cache entry");
                None
            }
        }
    }

    async fn put(&self, key: &str, record: &ResumeRecord) {
        if let Err(e) = fs::create_dir_all(&self.root).await {
            warn!(error = %e, dir = %self.root.display(), "Failed to create cache directory");
            return;
        }

        let json = match serde_json::to_vec_pretty(record) {
            Ok(json) => json,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to serialize cache entry");
                return;
            }
        };

        // last-writer-wins; concurrent writers of the same key store
        // identical content, so the race is harmless
        if let Err(e) = fs::write(self.entry_path(key), json).await {
            warn!(key = %key, error = %e, "Failed to write cache entry");
        } else {
            debug!(key = %key, "Cached parse result");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ResumeRecord {
        ResumeRecord {
            name: Some("Jane Doe".to_string()),
            email: Some("jane@x.com".to_string()),
            primary_skills: vec!["Python".to_string(), "SQL".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_content_key_is_stable_and_sensitive() {
        let key = content_key("Jane Doe\njane@x.com");
        assert_eq!(key, content_key("Jane Doe\njane@x.com"));
        assert_eq!(key.len(), 64);

        // any byte-level difference means a different key
        assert_ne!(key, content_key("Jane Doe\njane@x.com "));
        assert_ne!(key, content_key("jane doe\njane@x.com"));
        assert_ne!(content_key("resume a"), content_key("resume b"));
    }

    #[tokio::test]
    async fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().to_path_buf());
        let record = sample_record();
        let key = content_key("some resume text");

        assert!(cache.get(&key).await.is_none());
        cache.put(&key, &record).await;
        assert_eq!(cache.get(&key).await, Some(record));
    }

    #[tokio::test]
    async fn test_entries_are_pretty_printed_json() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().to_path_buf());
        let key = content_key("text");
        cache.put(&key, &sample_record()).await;

        let raw = tokio::fs::read_to_string(dir.path().join(format!("{}.json", key)))
            .await
            .unwrap();
        assert!(raw.contains("\n  \"name\""), "expected 2-space indentation: {}", raw);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCache::new(dir.path().to_path_buf());
        let key = content_key("text");

        tokio::fs::write(dir.path().join(format!("{}.json", key)), "{not json")
            .await
            .unwrap();
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_put_creates_root_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nested").join("cache");
        let cache = FileCache::new(root.clone());

        cache.put(&content_key("text"), &sample_record()).await;
        assert!(root.is_dir());
    }
}
