// src/parser/engine.rs
//! The parse orchestrator: cache check, model call, sanitize/decode,
//! retry with two-tier backoff, cache write-through.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::common::AppConfig;
use crate::parser::models::ResumeRecord;
use crate::parser::prompt::build_prompt;
use crate::parser::sanitize::sanitize_reply;
use crate::services::cache::{content_key, RecordCache};
use crate::services::gemini::{GenerationParams, ModelError, TextModel};

pub const DEFAULT_MAX_RETRIES: u32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Resume text is empty")]
    EmptyInput,

    #[error("Model call failed: {0}")]
    Model(#[from] ModelError),

    #[error("Model reply was not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Parsing failed after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: Box<ParseError>,
    },
}

/// Backoff delays between attempts. Malformed JSON is usually a formatting
/// fluke and retried quickly; transport failures get the longer delay.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub decode_retry_delay: Duration,
    pub transient_retry_delay: Duration,
}

impl From<&AppConfig> for RetryPolicy {
    fn from(config: &AppConfig) -> Self {
        Self {
            decode_retry_delay: config.decode_retry_delay,
            transient_retry_delay: config.transient_retry_delay,
        }
    }
}

/// Per-call knobs.
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    pub use_cache: bool,
    pub max_retries: u32,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl ParseOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            use_cache: config.use_cache,
            max_retries: config.max_retries,
        }
    }
}

/// Turns resume text into a [`ResumeRecord`] by prompting the model.
///
/// Holds the model client behind a trait object so tests can script the
/// replies, and an optional cache; a parser built without a cache simply
/// calls the model every time.
pub struct ResumeParser {
    model: Arc<dyn TextModel>,
    cache: Option<Arc<dyn RecordCache>>,
    generation: GenerationParams,
    retry: RetryPolicy,
}

impl ResumeParser {
    pub fn new(
        model: Arc<dyn TextModel>,
        cache: Option<Arc<dyn RecordCache>>,
        generation: GenerationParams,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            model,
            cache,
            generation,
            retry,
        }
    }

    /// Parse a resume text into structured fields.
    ///
    /// Empty input fails immediately. The cache is consulted once, before
    /// the retry loop: cache identity is a property of the input, not of
    /// any single attempt. Up to `max_retries` model calls are made; a
    /// malformed reply is retried with the same prompt (the model may
    /// legitimately answer differently), and once all attempts are spent
    /// the last error is surfaced as `Exhausted`.
    pub async fn parse_resume(
        &self,
        text: &str,
        options: &ParseOptions,
    ) -> Result<ResumeRecord, ParseError> {
        if text.trim().is_empty() {
            return Err(ParseError::EmptyInput);
        }

        let cache = if options.use_cache {
            self.cache.as_ref()
        } else {
            None
        };

        let key = content_key(text);
        if let Some(cache) = cache {
            if let Some(record) = cache.get(&key).await {
                debug!(key = %key, "Returning cached parse result");
                return Ok(record);
            }
        }

        let prompt = build_prompt(text);
        let max_attempts = options.max_retries.max(1);
        let mut last_error: Option<ParseError> = None;

        for attempt in 1..=max_attempts {
            match self.attempt(&prompt).await {
                Ok(record) => {
                    info!(attempt = attempt, "Resume parsed");
                    if let Some(cache) = cache {
                        cache.put(&key, &record).await;
                    }
                    return Ok(record);
                }
                Err(e) => {
                    let delay = match &e {
                        ParseError::Decode(_) => self.retry.decode_retry_delay,
                        _ => self.retry.transient_retry_delay,
                    };
                    warn!(
                        attempt = attempt,
                        max_attempts = max_attempts,
                        error = %e,
                        "Parse attempt failed"
                    );
                    last_error = Some(e);

                    if attempt < max_attempts {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }

        Err(ParseError::Exhausted {
            attempts: max_attempts,
            source: Box::new(last_error.unwrap_or_else(|| {
                ParseError::Model(ModelError::RequestFailed("Unknown error".to_string()))
            })),
        })
    }

    /// One model call: generate, sanitize, decode.
    async fn attempt(&self, prompt: &str) -> Result<ResumeRecord, ParseError> {
        let reply = self.model.generate(prompt, &self.generation).await?;
        let cleaned = sanitize_reply(&reply);
        let record = serde_json::from_str::<ResumeRecord>(cleaned)?;
        Ok(record)
    }
}
