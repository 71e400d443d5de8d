use std::sync::Arc;

use crate::config::{ApiKeySource, Config};
use crate::llm_client::GenerationService;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup; requests share nothing mutable.
#[derive(Clone)]
pub struct AppState {
    /// Generation backend. Production: `LlmClient`.
    pub llm: Arc<dyn GenerationService>,
    /// Resolved on every generate call, never cached.
    pub api_key: ApiKeySource,
    pub system_prompt: Arc<str>,
    pub config: Config,
}
