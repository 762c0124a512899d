// src/main.rs
use axum::extract::{DefaultBodyLimit, Extension};
use dotenv::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use resume_api::common::{AppConfig, AppState};
use resume_api::parser;
use resume_api::parser::engine::{ResumeParser, RetryPolicy};
use resume_api::services::{FileCache, GeminiService, GenerationParams, RecordCache};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = AppConfig::from_env()?;
    info!(
        model = %config.model_name,
        cache_enabled = config.use_cache,
        "Configuration loaded"
    );

    if config.use_cache {
        tokio::fs::create_dir_all(&config.cache_dir).await?;
        info!(cache_dir = %config.cache_dir.display(), "Cache directory ready");
    }

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let gemini = Arc::new(GeminiService::new(&config)?);
    info!("GeminiService initialized");

    let cache: Option<Arc<dyn RecordCache>> = if config.use_cache {
        Some(Arc::new(FileCache::new(config.cache_dir.clone())))
    } else {
        None
    };

    let resume_parser = Arc::new(ResumeParser::new(
        gemini,
        cache,
        GenerationParams::from(&config),
        RetryPolicy::from(&config),
    ));
    info!("ResumeParser initialized");

    // ========================================================================
    // APPLICATION STATE AND ROUTER
    // ========================================================================

    let max_file_size = config.max_file_size;
    let state = Arc::new(AppState {
        config,
        parser: resume_parser,
    });

    let app = parser::parser_routes()
        // multipart bodies carry some framing overhead beyond the file itself
        .layer(DefaultBodyLimit::max(max_file_size as usize + 64 * 1024))
        .layer(Extension(state))
        .layer({
            let cors_origins = std::env::var("CORS_ORIGINS").unwrap_or_else(|_| {
                "http://localhost:3000,http://localhost:5173".to_string()
            });

            let origins: Vec<axum::http::HeaderValue> = cors_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers([axum::http::header::CONTENT_TYPE])
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
