pub mod client;
pub mod prompt;
pub mod providers;
pub mod retry;

pub use client::ConversationClient;
pub use prompt::{Prompt, PromptInput};
pub use providers::mock::MockProvider;
pub use providers::openai_compat::{OpenAiCompatProvider, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use retry::RetryPolicy;
