// src/common/config.rs
//! Application configuration loaded from the environment

use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set. Add it to your environment or .env file")]
    MissingApiKey,
}

/// Runtime configuration shared by the server and the CLI.
///
/// Every knob can be overridden via environment variables; invalid values
/// fall back to the documented default rather than aborting startup. The
/// API key is the one exception: there is no default and no fallback.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub base_url: String,
    pub model_name: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub decode_retry_delay: Duration,
    pub transient_retry_delay: Duration,
    pub cache_dir: PathBuf,
    pub use_cache: bool,
    pub requests_per_minute: u32,
    pub max_file_size: u64,
    pub supported_extensions: Vec<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Fails only when `GEMINI_API_KEY` is absent or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let base_url = env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());

        let model_name = env::var("MODEL_NAME").unwrap_or_else(|_| "gemini-2.5-flash".to_string());

        let temperature = parse_env("TEMPERATURE", 0.1_f32);
        let max_output_tokens = parse_env("MAX_OUTPUT_TOKENS", 2000_u32);
        let request_timeout = Duration::from_secs(parse_env("API_REQUEST_TIMEOUT", 60_u64));
        let max_retries = parse_env("MAX_RETRIES", 3_u32).max(1);
        let decode_retry_delay = Duration::from_millis(parse_env("DECODE_RETRY_DELAY_MS", 1000_u64));
        let transient_retry_delay =
            Duration::from_millis(parse_env("TRANSIENT_RETRY_DELAY_MS", 2000_u64));

        let cache_dir = PathBuf::from(env::var("CACHE_DIR").unwrap_or_else(|_| "./cache".to_string()));

        // USE_CACHE=false disables caching; anything else keeps it on
        let use_cache = env::var("USE_CACHE")
            .map(|v| v.to_lowercase() != "false")
            .unwrap_or(true);

        let requests_per_minute = parse_env("REQUESTS_PER_MINUTE", 60_u32).max(1);
        let max_file_size = parse_env("MAX_FILE_SIZE", 10 * 1024 * 1024_u64);

        let supported_extensions = env::var("SUPPORTED_FORMATS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().trim_start_matches('.').to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .ok()
            .filter(|list| !list.is_empty())
            .unwrap_or_else(default_extensions);

        Ok(Self {
            api_key,
            base_url,
            model_name,
            temperature,
            max_output_tokens,
            request_timeout,
            max_retries,
            decode_retry_delay,
            transient_retry_delay,
            cache_dir,
            use_cache,
            requests_per_minute,
            max_file_size,
            supported_extensions,
        })
    }

    /// Minimum gap between consecutive model calls in batch mode, derived
    /// from the requests-per-minute ceiling.
    pub fn pacing_interval(&self) -> Duration {
        Duration::from_secs_f64(60.0 / self.requests_per_minute as f64)
    }
}

fn default_extensions() -> Vec<String> {
    crate::extract::SUPPORTED_EXTENSIONS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}
