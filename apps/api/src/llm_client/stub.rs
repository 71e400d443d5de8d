//! In-process `GenerationService` used by pipeline and router tests.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use super::{GenerationService, LlmError, LlmResponse};

pub enum StubReply {
    /// A single text content block.
    Text(String),
    /// Raw content blocks, for shapes other than a single text block.
    Blocks(serde_json::Value),
    /// Upstream API failure.
    Fail { status: u16 },
}

pub struct StubService {
    reply: StubReply,
    seen: Mutex<Vec<(String, String, String)>>,
}

impl StubService {
    pub fn new(reply: StubReply) -> Self {
        Self {
            reply,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(StubReply::Text(text.into()))
    }

    /// `(api_key, system, user_message)` for every call received.
    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationService for StubService {
    async fn generate(
        &self,
        api_key: &str,
        system: &str,
        user_message: &str,
    ) -> Result<LlmResponse, LlmError> {
        self.seen.lock().unwrap().push((
            api_key.to_string(),
            system.to_string(),
            user_message.to_string(),
        ));

        let content = match &self.reply {
            StubReply::Text(text) => json!([{ "type": "text", "text": text }]),
            StubReply::Blocks(blocks) => blocks.clone(),
            StubReply::Fail { status } => {
                return Err(LlmError::Api {
                    status: *status,
                    message: "stubbed failure".to_string(),
                })
            }
        };

        Ok(serde_json::from_value(json!({
            "content": content,
            "stop_reason": "end_turn"
        }))?)
    }
}
