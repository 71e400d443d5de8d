//! Axum route handlers for the Generation API.

use axum::{body::Bytes, extract::rejection::BytesRejection, extract::State, Json};
use serde_json::Value;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::contract::{Badge, BADGES};
use crate::generation::generator::generate_script;
use crate::generation::request::GenerationRequest;
use crate::state::AppState;

/// POST /api/generate
///
/// Validates the request, resolves the API key, and runs the generation
/// pipeline. Returns the model's scorecard JSON once it passes the contract.
///
/// The body is parsed as JSON whatever its `Content-Type`.
pub async fn handle_generate(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Value>, AppError> {
    let request: GenerationRequest = serde_json::from_slice(&body?)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    request.validate()?;

    let api_key = state.api_key.resolve().ok_or(AppError::NotConfigured)?;

    let request_id = Uuid::new_v4();
    let result = generate_script(
        state.llm.as_ref(),
        &api_key,
        &state.system_prompt,
        &request,
    )
    .instrument(info_span!("generate", %request_id))
    .await?;

    Ok(Json(result))
}

/// GET /api/badges
///
/// The badge catalog, so clients render badge names from one source.
pub async fn handle_badges() -> Json<&'static [Badge]> {
    Json(&BADGES[..])
}
