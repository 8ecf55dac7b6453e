use std::sync::Arc;

use tracing::{debug, info, warn};

use mathmentor_core::{ApiKey, ChatMessage, ChatProvider, ChatReply, ChatRequest, CompletionError, History};

use crate::prompt::Prompt;
use crate::retry::RetryPolicy;

/// Sends prompts with the accumulated history to a chat-completion provider.
///
/// The client owns every history mutation: a successful call appends the
/// prompt's transcript as a user turn followed by the reply as an assistant
/// turn. A failed call leaves the history untouched.
#[derive(Clone)]
pub struct ConversationClient {
    provider: Arc<dyn ChatProvider>,
    model: String,
    retry: RetryPolicy,
}

impl ConversationClient {
    pub fn new(provider: Arc<dyn ChatProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Send `prompt` after the existing `history` and return the reply text.
    pub async fn send(
        &self,
        api_key: &ApiKey,
        prompt: &Prompt,
        history: &mut History,
    ) -> Result<String, CompletionError> {
        let mut messages = history.as_slice().to_vec();
        messages.push(ChatMessage::user(prompt.text.clone()));

        let request = ChatRequest {
            model: self.model.clone(),
            messages,
            api_key: api_key.clone(),
        };

        let reply = self.complete_with_retry(&request).await?;

        history.push_user(prompt.transcript.clone());
        history.push_assistant(reply.content.clone());
        Ok(reply.content)
    }

    async fn complete_with_retry(&self, request: &ChatRequest) -> Result<ChatReply, CompletionError> {
        let mut attempt = 1;
        loop {
            debug!(provider = %self.provider.name(), attempt, "Calling provider");
            match self.provider.complete(request).await {
                Ok(reply) => {
                    info!(
                        provider = %reply.provider,
                        model = %reply.model,
                        tokens = reply.tokens_used,
                        latency_ms = reply.latency_ms,
                        "Provider responded"
                    );
                    return Ok(reply);
                }
                Err(e) if e.is_retryable() && self.retry.should_retry(attempt) => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        error = %e,
                        attempt,
                        max = self.retry.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Completion failed, will retry"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(error = %e, attempt, "Completion failed");
                    return Err(e);
                }
            }
        }
    }
}
