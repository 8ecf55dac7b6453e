use anyhow::Result;
use async_trait::async_trait;
use image::GrayImage;

use crate::error::CompletionError;
use crate::message::ChatMessage;
use crate::types::ApiKey;

/// Trait for remote chat-completion backends.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider name (e.g., "groq", "mock").
    fn name(&self) -> &str;

    /// Send one completion request; a single attempt, no retries.
    async fn complete(&self, request: &ChatRequest) -> Result<ChatReply, CompletionError>;
}

/// Request to a chat-completion provider.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub api_key: ApiKey,
}

/// Successful reply from a chat-completion provider.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub content: String,
    pub provider: String,
    pub model: String,
    pub tokens_used: u64,
    pub latency_ms: u64,
}

/// Text recognition backend fed with preprocessed grayscale images.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Recognize text in `image`. The returned text is untrimmed.
    async fn recognize(&self, image: &GrayImage) -> Result<String>;
}
