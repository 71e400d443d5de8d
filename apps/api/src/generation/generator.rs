//! Script Generation: orchestrates one request/response round trip.
//!
//! Flow: build_user_message → GenerationService → leading text block →
//!       normalize → contract::validate → recovered JSON.
//!
//! Nothing is persisted and nothing is retried here; transient transport
//! retries live in the LLM client.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::generation::contract;
use crate::generation::normalizer::normalize;
use crate::generation::request::{build_user_message, GenerationRequest};
use crate::llm_client::GenerationService;

/// Runs the pipeline for an already-validated request.
///
/// Returns the recovered JSON value itself rather than a re-serialized
/// `GenerationResult`, so the client receives exactly what the model
/// produced once it has passed validation.
pub async fn generate_script(
    service: &dyn GenerationService,
    api_key: &str,
    system_prompt: &str,
    request: &GenerationRequest,
) -> Result<Value, AppError> {
    let user_message = build_user_message(request);
    debug!("User message:\n{user_message}");

    let response = service
        .generate(api_key, system_prompt, &user_message)
        .await?;

    if response.hit_token_ceiling() {
        warn!("Generation stopped at the token ceiling; output is likely truncated");
    }

    let text = response.leading_text().ok_or_else(|| {
        AppError::UnexpectedFormat(
            response
                .leading_block_type()
                .unwrap_or("<no content>")
                .to_string(),
        )
    })?;

    let value = normalize(text).map_err(|e| {
        debug!(
            "Unparseable model output: {:?}",
            text.chars().take(200).collect::<String>()
        );
        AppError::GenerationFailed(e.to_string())
    })?;

    let result =
        contract::validate(&value).map_err(|e| AppError::GenerationFailed(e.to_string()))?;

    for issue in result.inconsistencies() {
        warn!("Model scorecard inconsistency: {issue}");
    }

    info!(
        "Generated {} script: {} words, grade {:?} ({}/100), badges={:?}",
        result.format,
        result.word_count,
        result.score.letter_grade,
        result.score.total_normalized,
        result.badges
    );

    Ok(value)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
