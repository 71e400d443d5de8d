use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant renders as `{ "error": "<message>" }`; internal details are
/// logged, never sent to the client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or blank required field. The message is shown verbatim.
    #[error("{0}")]
    Validation(String),

    #[error("Invalid request body: {0}")]
    BadRequest(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Generation API key is not configured")]
    NotConfigured,

    #[error("Upstream returned a non-text leading content block: {0}")]
    UnexpectedFormat(String),

    #[error("Model output could not be used: {0}")]
    GenerationFailed(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::BadRequest(detail) => {
                tracing::debug!("Rejected request body: {detail}");
                (StatusCode::BAD_REQUEST, "invalid request body.")
            }
            AppError::PayloadTooLarge => {
                (StatusCode::PAYLOAD_TOO_LARGE, "request body too large.")
            }
            AppError::NotConfigured => {
                tracing::error!("Generation requested but the API key is not configured");
                (StatusCode::INTERNAL_SERVER_ERROR, "API not configured.")
            }
            AppError::UnexpectedFormat(block_type) => {
                tracing::error!("Upstream leading content block was '{block_type}', not text");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "unexpected response format.",
                )
            }
            AppError::GenerationFailed(reason) => {
                tracing::warn!("Generation failed: {reason}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to generate. try again.",
                )
            }
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "something went wrong. try again.",
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
