//! Tests for the parser module
//!
//! These tests verify the core parsing behavior including:
//! - Empty-input guard and retry/backoff semantics
//! - Cache idempotence and key sensitivity
//! - Batch resilience and deterministic ordering
//! - Record serialization (absent vs empty fields)

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::parser::batch::{self, BatchOptions};
    use crate::parser::engine::{ParseError, ParseOptions, ResumeParser, RetryPolicy};
    use crate::parser::models::{BatchOutcome, ResumeRecord};
    use crate::services::cache::{content_key, FileCache, RecordCache};
    use crate::services::gemini::{GenerationParams, ModelError, TextModel};

    /// Deterministic stand-in for the remote model: replays a scripted
    /// sequence of replies and counts how often it was invoked.
    struct ScriptedModel {
        replies: Mutex<VecDeque<Result<String, ModelError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedModel {
        fn new(replies: Vec<Result<String, ModelError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TextModel for ScriptedModel {
        async fn generate(
            &self,
            _prompt: &str,
            _params: &GenerationParams,
        ) -> Result<String, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ModelError::RequestFailed("script exhausted".to_string())))
        }
    }

    fn test_parser(
        model: Arc<ScriptedModel>,
        cache: Option<Arc<dyn RecordCache>>,
    ) -> ResumeParser {
        ResumeParser::new(
            model,
            cache,
            GenerationParams {
                temperature: 0.1,
                max_output_tokens: 2000,
            },
            // millisecond backoffs keep the retry tests fast
            RetryPolicy {
                decode_retry_delay: Duration::from_millis(1),
                transient_retry_delay: Duration::from_millis(1),
            },
        )
    }

    fn jane_doe_reply() -> String {
        "```json\n{\"name\":\"Jane Doe\",\"email\":\"jane@x.com\",\
         \"primarySkills\":[\"Python\",\"SQL\"],\"secondarySkills\":[]}\n```"
            .to_string()
    }

    fn no_cache() -> ParseOptions {
        ParseOptions {
            use_cache: false,
            max_retries: 3,
        }
    }

    // ------------------------------------------------------------------
    // orchestrator
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_empty_input_never_calls_model() {
        let model = ScriptedModel::new(vec![Ok(jane_doe_reply())]);
        let parser = test_parser(model.clone(), None);

        for text in ["", "   ", "\n\t  \n"] {
            let err = parser.parse_resume(text, &no_cache()).await.unwrap_err();
            assert!(matches!(err, ParseError::EmptyInput));
        }
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_parses_fenced_reply() {
        let model = ScriptedModel::new(vec![Ok(jane_doe_reply())]);
        let parser = test_parser(model.clone(), None);

        let record = parser
            .parse_resume("Jane Doe\njane@x.com\nSkills: Python, SQL", &no_cache())
            .await
            .unwrap();

        assert_eq!(record.name.as_deref(), Some("Jane Doe"));
        assert_eq!(record.email.as_deref(), Some("jane@x.com"));
        assert_eq!(record.primary_skills, vec!["Python", "SQL"]);
        assert!(record.secondary_skills.is_empty());
        // unspecified fields are absent, not empty
        assert_eq!(record.phone, None);
        assert_eq!(record.position, None);
        assert_eq!(record.summary, None);
        assert_eq!(record.experience, None);
        assert_eq!(record.education, None);
        assert_eq!(record.skills_source, None);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_decode_failures_retry_then_succeed() {
        let model = ScriptedModel::new(vec![
            Ok("Sure! Here is the resume analysis you asked for.".to_string()),
            Ok("```json\n{\"name\": \"Jane\", \"primarySkills\": [broken]}\n```".to_string()),
            Ok(jane_doe_reply()),
        ]);
        let parser = test_parser(model.clone(), None);

        let record = parser.parse_resume("Jane Doe", &no_cache()).await.unwrap();
        assert_eq!(record.name.as_deref(), Some("Jane Doe"));
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test]
    async fn test_transport_failure_then_success() {
        let model = ScriptedModel::new(vec![
            Err(ModelError::RateLimitExceeded),
            Err(ModelError::EmptyResponse),
            Ok(jane_doe_reply()),
        ]);
        let parser = test_parser(model.clone(), None);

        let record = parser.parse_resume("Jane Doe", &no_cache()).await.unwrap();
        assert_eq!(record.name.as_deref(), Some("Jane Doe"));
        assert_eq!(model.calls(), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_after_exactly_max_retries() {
        // the script is empty, so every call fails with a transport error
        let model = ScriptedModel::new(vec![]);
        let parser = test_parser(model.clone(), None);

        let err = parser.parse_resume("Jane Doe", &no_cache()).await.unwrap_err();
        match err {
            ParseError::Exhausted { attempts, source } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*source, ParseError::Model(_)));
            }
            other => panic!("expected Exhausted, got {:?}", other),
        }
        assert_eq!(model.calls(), 3, "exactly max_retries attempts, never more");
    }

    #[tokio::test]
    async fn test_exhaustion_carries_last_decode_error() {
        let model = ScriptedModel::new(vec![
            Ok("not json".to_string()),
            Ok("still not json".to_string()),
        ]);
        let parser = test_parser(model.clone(), None);

        let options = ParseOptions {
            use_cache: false,
            max_retries: 2,
        };
        let err = parser.parse_resume("Jane Doe", &options).await.unwrap_err();
        match err {
            ParseError::Exhausted { attempts, source } => {
                assert_eq!(attempts, 2);
                assert!(matches!(*source, ParseError::Decode(_)));
            }
            other => panic!("expected Exhausted, got {:?}", other),
        }
        assert_eq!(model.calls(), 2);
    }

    // ------------------------------------------------------------------
    // caching
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_cache_makes_repeat_parse_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let cache: Arc<dyn RecordCache> = Arc::new(FileCache::new(dir.path().to_path_buf()));
        let model = ScriptedModel::new(vec![Ok(jane_doe_reply())]);
        let parser = test_parser(model.clone(), Some(cache));

        let options = ParseOptions {
            use_cache: true,
            max_retries: 3,
        };
        let text = "Jane Doe\njane@x.com\nSkills: Python, SQL";

        let first = parser.parse_resume(text, &options).await.unwrap();
        let second = parser.parse_resume(text, &options).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(model.calls(), 1, "second parse must be served from cache");

        // the entry is stored under the content hash of the exact input
        let entry = dir.path().join(format!("{}.json", content_key(text)));
        assert!(entry.is_file());
    }

    #[tokio::test]
    async fn test_distinct_texts_use_distinct_cache_entries() {
        let dir = tempfile::tempdir().unwrap();
        let cache: Arc<dyn RecordCache> = Arc::new(FileCache::new(dir.path().to_path_buf()));
        let model = ScriptedModel::new(vec![Ok(jane_doe_reply()), Ok(jane_doe_reply())]);
        let parser = test_parser(model.clone(), Some(cache));

        let options = ParseOptions {
            use_cache: true,
            max_retries: 3,
        };

        parser.parse_resume("resume one", &options).await.unwrap();
        parser.parse_resume("resume two", &options).await.unwrap();

        assert_eq!(model.calls(), 2, "different texts must not share a cache key");
    }

    #[tokio::test]
    async fn test_use_cache_false_bypasses_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache: Arc<dyn RecordCache> = Arc::new(FileCache::new(dir.path().to_path_buf()));
        let model = ScriptedModel::new(vec![Ok(jane_doe_reply()), Ok(jane_doe_reply())]);
        let parser = test_parser(model.clone(), Some(cache));

        parser.parse_resume("Jane Doe", &no_cache()).await.unwrap();
        parser.parse_resume("Jane Doe", &no_cache()).await.unwrap();

        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_parse_is_never_cached() {
        let dir = tempfile::tempdir().unwrap();
        let cache: Arc<dyn RecordCache> = Arc::new(FileCache::new(dir.path().to_path_buf()));
        let model = ScriptedModel::new(vec![]);
        let parser = test_parser(model.clone(), Some(cache));

        let options = ParseOptions {
            use_cache: true,
            max_retries: 2,
        };
        let text = "Jane Doe";
        parser.parse_resume(text, &options).await.unwrap_err();

        let entry = dir.path().join(format!("{}.json", content_key(text)));
        assert!(!entry.exists(), "error states must not reach the cache");
    }

    // ------------------------------------------------------------------
    // batch driver
    // ------------------------------------------------------------------

    fn batch_options() -> BatchOptions {
        BatchOptions {
            parse: ParseOptions {
                use_cache: false,
                max_retries: 1,
            },
            pacing: Duration::ZERO,
            max_file_size: 1024 * 1024,
            extensions: ["txt", "text", "pdf", "docx"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_one_bad_file_does_not_abort_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "resume a").unwrap();
        std::fs::write(dir.path().join("b.txt"), "resume b").unwrap();
        // a garbage PDF fails extraction, not the batch
        std::fs::write(dir.path().join("c.pdf"), b"definitely not a pdf").unwrap();
        // unsupported extensions are not picked up at all
        std::fs::write(dir.path().join("d.rtf"), "ignored").unwrap();

        let model = ScriptedModel::new(vec![Ok(jane_doe_reply()), Ok(jane_doe_reply())]);
        let parser = test_parser(model.clone(), None);

        let mut seen = Vec::new();
        let outcomes = batch::process_directory(
            &parser,
            dir.path(),
            &batch_options(),
            |index, total, filename| seen.push((index, total, filename.to_string())),
        )
        .await
        .unwrap();

        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0].filename, "a.txt");
        assert_eq!(outcomes[1].filename, "b.txt");
        assert_eq!(outcomes[2].filename, "c.pdf");

        assert_eq!(outcomes.iter().filter(|o| !o.success).count(), 1);
        assert!(outcomes[0].success && outcomes[1].success);
        assert!(!outcomes[2].success);
        assert!(outcomes[2].error.is_some());
        assert!(outcomes[2].data.is_none());

        assert_eq!(model.calls(), 2, "the unreadable file never reaches the model");
        assert_eq!(
            seen,
            vec![
                (0, 3, "a.txt".to_string()),
                (1, 3, "b.txt".to_string()),
                (2, 3, "c.pdf".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_batch_results_file_is_an_indented_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let outcomes = vec![
            BatchOutcome::parsed(
                "a.txt".to_string(),
                ResumeRecord {
                    name: Some("Jane Doe".to_string()),
                    ..Default::default()
                },
            ),
            BatchOutcome::failed("b.pdf".to_string(), "PDF extraction failed".to_string()),
        ];

        let path = dir.path().join("results.json");
        batch::write_results(&path, &outcomes).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("[\n  {"), "expected 2-space indentation: {}", raw);

        let roundtrip: Vec<BatchOutcome> = serde_json::from_str(&raw).unwrap();
        assert_eq!(roundtrip, outcomes);

        // failure entries carry error but no data, success entries the reverse
        assert!(raw.contains("\"error\""));
        assert!(!raw.contains("\"error\": null"));
    }

    #[tokio::test]
    async fn test_batch_requires_a_directory() {
        let parser = test_parser(ScriptedModel::new(vec![]), None);
        let missing = std::path::Path::new("/nonexistent/resumes");

        let err = batch::process_directory(&parser, missing, &batch_options(), |_, _, _| {})
            .await
            .unwrap_err();
        assert!(matches!(err, batch::BatchError::NotADirectory(_)));
    }

    // ------------------------------------------------------------------
    // record serialization
    // ------------------------------------------------------------------

    #[test]
    fn test_absent_fields_stay_absent_in_json() {
        let record = ResumeRecord {
            name: Some("Jane Doe".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"name\":\"Jane Doe\""));
        assert!(!json.contains("\"email\""), "absent fields are omitted: {}", json);
        // skill lists are always present, possibly empty
        assert!(json.contains("\"primarySkills\":[]"));
        assert!(json.contains("\"secondarySkills\":[]"));
    }

    #[test]
    fn test_null_and_missing_fields_decode_to_none() {
        let record: ResumeRecord =
            serde_json::from_str(r#"{"name": null, "primarySkills": ["Rust"]}"#).unwrap();
        assert_eq!(record.name, None);
        assert_eq!(record.email, None);
        assert_eq!(record.primary_skills, vec!["Rust"]);
        assert!(record.secondary_skills.is_empty());
    }

    #[test]
    fn test_record_uses_camel_case_field_names() {
        let record = ResumeRecord {
            skills_source: Some("Listed in the skills section".to_string()),
            primary_skills: vec!["Rust".to_string()],
            ..Default::default()
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"skillsSource\""));
        assert!(json.contains("\"primarySkills\""));
        assert!(!json.contains("skills_source"));
    }
}
