use super::handlers;
use axum::{
    routing::{get, post},
    Router,
};

/// Creates the parser router with the web page and the parsing API
pub fn parser_routes() -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/health", get(handlers::health))
        .route("/api/parse/file", post(handlers::parse_upload))
        .route("/api/parse/text", post(handlers::parse_text))
        .route("/api/export/markdown", post(handlers::export_markdown))
}
