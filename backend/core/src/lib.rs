pub mod error;
pub mod message;
pub mod traits;
pub mod types;

pub use error::{CompletionError, TutorError};
pub use message::{ChatMessage, History, Role};
pub use traits::{ChatProvider, ChatReply, ChatRequest, OcrEngine};
pub use types::{ActionKind, ApiKey, Requirement};
