//! AI backend capability — the single point of entry for model calls.
//!
//! The outreach generator consumes `AiBackend` and never reaches a global;
//! the production implementation speaks the Anthropic Messages API. Errors
//! are split into transport (retryable by the caller) and rejection
//! (terminal), which drives the generator's retry policy.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Error)]
pub enum AiError {
    /// Network-level failure or retryable upstream status (429/5xx).
    #[error("transport failure")]
    Transport,

    /// Model-level rejection (4xx, empty content). Not retried.
    #[error("backend rejected the request: {0}")]
    Rejected(String),

    #[error("generation timed out")]
    Timeout,
}

/// Capability for text generation with an explicit health probe.
#[async_trait]
pub trait AiBackend: Send + Sync {
    async fn generate(&self, prompt: &str, system: &str) -> Result<String, AiError>;
    /// Cheap availability check consulted before each generation attempt.
    async fn health_check(&self) -> bool;
    fn model(&self) -> &str;
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

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

impl AnthropicResponse {
    fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

/// Anthropic Messages API backend.
pub struct AnthropicBackend {
    client: Client,
    api_key: String,
    model: String,
}

impl AnthropicBackend {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl AiBackend for AnthropicBackend {
    async fn generate(&self, prompt: &str, system: &str) -> Result<String, AiError> {
        let request_body = AnthropicRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|_| AiError::Transport)?;

        let status = response.status();
        if status.as_u16() == 429 || status.is_server_error() {
            return Err(AiError::Transport);
        }
        if !status.is_success() {
            return Err(AiError::Rejected(format!("status {}", status.as_u16())));
        }

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|_| AiError::Rejected("unparseable response".to_string()))?;
        debug!(
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "generation call succeeded"
        );
        parsed
            .text()
            .map(str::to_string)
            .ok_or_else(|| AiError::Rejected("empty content".to_string()))
    }

    async fn health_check(&self) -> bool {
        !self.api_key.is_empty()
    }

    fn model(&self) -> &str {
        &self.model
    }
}
