use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TutorError;

/// User-supplied credential for the chat-completion API.
///
/// Held only in memory for the life of one session. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Build a key from user input, rejecting blank values.
    pub fn new(raw: impl Into<String>) -> Result<Self, TutorError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TutorError::MissingCredential);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// The four tutor actions a user can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Solve,
    Hint,
    Check,
    Chat,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] = [
        ActionKind::Solve,
        ActionKind::Hint,
        ActionKind::Check,
        ActionKind::Chat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Solve => "solve",
            ActionKind::Hint => "hint",
            ActionKind::Check => "check",
            ActionKind::Chat => "chat",
        }
    }

    /// Button label used by the user-facing surfaces.
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Solve => "Show Solution",
            ActionKind::Hint => "Generate Hint",
            ActionKind::Check => "Check Answer",
            ActionKind::Chat => "Send",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = TutorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TutorError::UnknownAction(s.to_string()))
    }
}

/// An input an action needs before it may call the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    /// Non-empty problem text (typed or extracted from an image).
    Problem,
    /// Non-empty student answer.
    Answer,
    /// Non-empty follow-up message.
    ChatText,
}

impl Requirement {
    pub fn describe(&self) -> &'static str {
        match self {
            Requirement::Problem => "a math problem is required",
            Requirement::Answer => "an answer is required",
            Requirement::ChatText => "a follow-up message is required",
        }
    }
}
