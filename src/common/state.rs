// Application state shared across all handlers

use std::sync::Arc;

use crate::common::AppConfig;
use crate::parser::engine::ResumeParser;

/// Application state containing the runtime configuration and the
/// parsing service. Immutable once the server has started.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub parser: Arc<ResumeParser>,
}
