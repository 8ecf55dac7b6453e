use thiserror::Error;

/// Top-level error type for tutor actions.
#[derive(Debug, Error)]
pub enum TutorError {
    #[error("an API key is required before the tutor can be used")]
    MissingCredential,

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure of one chat-completion call, tagged by kind so callers can
/// decide how to present it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompletionError {
    #[error("authentication rejected ({status}): {body}")]
    Auth { status: u16, body: String },

    #[error("rate limited: {body}")]
    RateLimited { body: String },

    #[error("request rejected ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("transport failure: {0}")]
    Transport(String),
}

impl CompletionError {
    /// Classify a non-success HTTP status together with its raw body.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            401 | 403 => Self::Auth { status, body },
            429 => Self::RateLimited { body },
            _ => Self::Rejected { status, body },
        }
    }

    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Transport(_) => true,
            Self::Rejected { status, .. } => *status >= 500,
            Self::Auth { .. } | Self::Malformed(_) => false,
        }
    }

    /// Text shown to the user in place of a reply.
    pub fn display_text(&self) -> String {
        match self {
            Self::Auth { body, .. } => {
                format!("Error: the API key was rejected. Check it and try again. {body}")
            }
            Self::RateLimited { body } => {
                format!("Error: the tutor is receiving too many requests right now. {body}")
            }
            Self::Rejected { body, .. } => format!("Error: {body}"),
            Self::Malformed(body) => format!("Error: unexpected response from the API: {body}"),
            Self::Transport(message) => format!("API Request Failed: {message}"),
        }
    }
}
