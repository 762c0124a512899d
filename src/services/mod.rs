// src/services/mod.rs
//
// Shared services: the outbound model client and the result cache

pub mod cache;
pub mod gemini;

// Re-export commonly used types for convenience
pub use cache::{content_key, FileCache, RecordCache};
pub use gemini::{GeminiService, GenerationParams, ModelError, TextModel};
