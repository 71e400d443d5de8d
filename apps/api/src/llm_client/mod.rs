/// LLM Client: the single point of entry for all generation-service calls.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// Handlers and the generation pipeline talk to [`GenerationService`]; the
/// production implementation is [`LlmClient`].
///
/// Model and output ceiling are constants, never user-controlled.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

#[cfg(test)]
pub mod stub;

pub const DEFAULT_ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for every generation call.
pub const MODEL: &str = "claude-sonnet-4-5-20250929";
pub const MAX_TOKENS: u32 = 4096;
const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Could not decode API response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Text of the first content block. `None` when the response has no
    /// content or its first block is not a text block.
    pub fn leading_text(&self) -> Option<&str> {
        let first = self.content.first()?;
        if first.block_type != "text" {
            return None;
        }
        Some(first.text.as_deref().unwrap_or_default())
    }

    /// Type tag of the first content block, for diagnostics.
    pub fn leading_block_type(&self) -> Option<&str> {
        self.content.first().map(|b| b.block_type.as_str())
    }

    pub fn hit_token_ceiling(&self) -> bool {
        self.stop_reason.as_deref() == Some("max_tokens")
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// A text-generation backend: fixed system instruction plus one user message
/// in, raw typed content blocks out.
///
/// Carried in `AppState` as `Arc<dyn GenerationService>`.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(
        &self,
        api_key: &str,
        system: &str,
        user_message: &str,
    ) -> Result<LlmResponse, LlmError>;
}

/// Wraps the Anthropic Messages API with a bounded timeout and a bounded
/// retry on transient failures (transport errors, 429, 5xx).
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    messages_url: String,
    max_attempts: u32,
    backoff: Duration,
}

impl LlmClient {
    pub fn new(base_url: &str, timeout: Duration, max_attempts: u32) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            messages_url: format!("{}/v1/messages", base_url.trim_end_matches('/')),
            max_attempts: max_attempts.max(1),
            backoff: DEFAULT_BACKOFF,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        Ok(Self::new(
            &config.anthropic_api_url,
            Duration::from_secs(config.llm_timeout_secs),
            config.llm_max_attempts,
        )?
        .with_backoff(Duration::from_millis(config.llm_retry_backoff_ms)))
    }

    /// Base delay before the first retry; doubles on each further retry.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Makes a raw call to the Messages API, returning the full response object.
    pub async fn call(
        &self,
        api_key: &str,
        prompt: &str,
        system: &str,
    ) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let mut attempt: u32 = 1;

        loop {
            let response = self
                .client
                .post(&self.messages_url)
                .header("x-api-key", api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let error = match response {
                Err(e) => {
                    warn!("LLM transport error: {e}");
                    LlmError::Http(e)
                }
                Ok(response) => {
                    let status = response.status();

                    if status.as_u16() == 429 || status.is_server_error() {
                        let body = response.text().await.unwrap_or_default();
                        warn!("LLM API returned {}: {}", status, body);
                        LlmError::Api {
                            status: status.as_u16(),
                            message: body,
                        }
                    } else if !status.is_success() {
                        let body = response.text().await.unwrap_or_default();
                        let message = serde_json::from_str::<AnthropicError>(&body)
                            .map(|e| e.error.message)
                            .unwrap_or(body);
                        return Err(LlmError::Api {
                            status: status.as_u16(),
                            message,
                        });
                    } else {
                        let body = response.text().await?;
                        let llm_response: LlmResponse = serde_json::from_str(&body)?;

                        let usage = llm_response.usage.clone().unwrap_or_default();
                        debug!(
                            "LLM call succeeded: input_tokens={}, output_tokens={}, stop_reason={:?}",
                            usage.input_tokens, usage.output_tokens, llm_response.stop_reason
                        );

                        return Ok(llm_response);
                    }
                }
            };

            if attempt >= self.max_attempts {
                return Err(error);
            }

            let delay = self.retry_delay(attempt);
            warn!(
                "LLM call attempt {} failed, retrying after {}ms...",
                attempt,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Delay after the given failed attempt (1-based). Saturates instead of
    /// overflowing for very large base backoffs.
    fn retry_delay(&self, failed_attempt: u32) -> Duration {
        let factor = 2u32.pow(failed_attempt.saturating_sub(1).min(6));
        self.backoff.checked_mul(factor).unwrap_or(Duration::MAX)
    }
}

#[async_trait]
impl GenerationService for LlmClient {
    async fn generate(
        &self,
        api_key: &str,
        system: &str,
        user_message: &str,
    ) -> Result<LlmResponse, LlmError> {
        self.call(api_key, user_message, system).await
    }
}
