mod config;
mod errors;
mod generation;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{ApiKeySource, Config, API_KEY_ENV};
use crate::generation::prompts::load_system_prompt;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SIF API v{}", env!("CARGO_PKG_VERSION"));

    let system_prompt = load_system_prompt(config.system_prompt_path.as_deref())?;
    match &config.system_prompt_path {
        Some(path) => info!("System prompt loaded from {}", path.display()),
        None => info!("Using built-in system prompt"),
    }

    // Initialize LLM client
    let llm = LlmClient::from_config(&config)?;
    info!(
        "LLM client initialized (model: {}, timeout: {}s, max attempts: {})",
        llm_client::MODEL,
        config.llm_timeout_secs,
        llm.max_attempts()
    );

    // The key is looked up per request; a missing key is not fatal here.
    let api_key = ApiKeySource::Env(API_KEY_ENV);
    if api_key.resolve().is_none() {
        warn!("{API_KEY_ENV} is not set; /api/generate will answer 500 until it is");
    }

    let state = AppState {
        llm: Arc::new(llm),
        api_key,
        system_prompt,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
