// src/parser/handlers.rs
//! HTTP handlers for the parsing API and the embedded web page.

use axum::{
    extract::{Extension, Multipart, Query},
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::common::{ApiError, AppState};
use crate::extract;
use crate::parser::engine::ParseOptions;
use crate::parser::markdown::render_markdown;
use crate::parser::models::ResumeRecord;

/// GET / - embedded single-page UI
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

/// GET /api/health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
pub struct CacheQuery {
    /// `?cache=false` bypasses the result cache for this request.
    cache: Option<bool>,
}

/// POST /api/parse/file - parse an uploaded resume (multipart, field `file`)
pub async fn parse_upload(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<CacheQuery>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart payload".to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(|n| n.to_string())
            .ok_or_else(|| ApiError::BadRequest("Uploaded file has no filename".to_string()))?;

        let data = field
            .bytes()
            .await
            .map_err(|_| ApiError::BadRequest("Invalid file".to_string()))?;

        if data.len() as u64 > state.config.max_file_size {
            return Err(ApiError::BadRequest(format!(
                "File too large: {} bytes (limit is {})",
                data.len(),
                state.config.max_file_size
            )));
        }

        let ext = extract::extension_of(&filename);
        if !state.config.supported_extensions.iter().any(|e| e == &ext) {
            return Err(ApiError::BadRequest(format!(
                "Unsupported file format: .{}",
                ext
            )));
        }

        let text = extract::text_from_bytes(&filename, &data)?;
        let record = parse_with(&state, &text, query.cache).await?;

        info!(filename = %filename, "Resume parsed via upload");

        return Ok(Json(json!({
            "filename": filename,
            "parsed_at": Utc::now().to_rfc3339(),
            "data": record,
        })));
    }

    Err(ApiError::BadRequest("No resume file provided".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct ParseTextRequest {
    text: String,
    #[serde(default)]
    no_cache: bool,
}

/// POST /api/parse/text - parse pasted resume text
pub async fn parse_text(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<ParseTextRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let record = parse_with(&state, &request.text, Some(!request.no_cache)).await?;

    info!(chars = request.text.len(), "Resume parsed via pasted text");

    Ok(Json(json!({
        "parsed_at": Utc::now().to_rfc3339(),
        "data": record,
    })))
}

/// POST /api/export/markdown - render a parsed record as a Markdown download
pub async fn export_markdown(Json(record): Json<ResumeRecord>) -> impl IntoResponse {
    let markdown = render_markdown(&record);
    (
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"resume_parsed.md\"",
            ),
        ],
        markdown,
    )
}

async fn parse_with(
    state: &AppState,
    text: &str,
    cache_override: Option<bool>,
) -> Result<ResumeRecord, ApiError> {
    let mut options = ParseOptions::from_config(&state.config);
    if let Some(cache) = cache_override {
        // a request can opt out of caching but never force it on when the
        // server runs without a cache
        options.use_cache = options.use_cache && cache;
    }
    Ok(state.parser.parse_resume(text, &options).await?)
}
