use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use mathmentor_core::{ChatMessage, ChatProvider, ChatReply, ChatRequest, CompletionError};

/// Groq's OpenAI-compatible API root.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Model requested when configuration does not name one.
pub const DEFAULT_MODEL: &str = "llama3-8b-8192";

/// Provider for any endpoint speaking the OpenAI chat-completions protocol.
pub struct OpenAiCompatProvider {
    client: Client,
    base_url: String,
    name: String,
}

impl OpenAiCompatProvider {
    /// Build a provider whose requests give up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            name: "groq".to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    messages: &'a [ChatMessage],
    model: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: Option<u64>,
}

/// Pull `choices[0].message.content` out of a success body.
fn parse_reply(body: &str) -> Result<(String, u64), CompletionError> {
    let parsed: CompletionResponse =
        serde_json::from_str(body).map_err(|_| CompletionError::Malformed(body.to_string()))?;
    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| CompletionError::Malformed(body.to_string()))?;
    let tokens = parsed.usage.and_then(|u| u.total_tokens).unwrap_or(0);
    Ok((content, tokens))
}

#[async_trait]
impl ChatProvider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, CompletionError> {
        let start = Instant::now();
        let body = CompletionBody {
            messages: &request.messages,
            model: &request.model,
        };

        debug!(
            model = %request.model,
            turns = request.messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", request.api_key.expose()))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(CompletionError::from_status(status.as_u16(), text));
        }

        let (content, tokens_used) = parse_reply(&text)?;

        Ok(ChatReply {
            content,
            provider: self.name.clone(),
            model: request.model.clone(),
            tokens_used,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
