use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mathmentor_core::{ApiKey, History, TutorError};

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A one-line status message shown alongside the stored outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, text: text.into() }
    }
}

/// Everything the tutor remembers for one session.
///
/// Output fields are overwritten by the next successful action of their
/// kind; failures never touch them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub history: History,
    pub solution: Option<String>,
    pub hint: Option<String>,
    pub answer_feedback: Option<String>,
    pub chat_reply: Option<String>,
    /// Problem text read from the last uploaded image.
    pub extracted_text: Option<String>,
    /// Result of the last image upload.
    pub ocr_notice: Option<Notice>,
    /// Error from the last failed action, cleared by the next success.
    pub notice: Option<Notice>,
}

/// One user's session: an id, the in-memory credential, and the state.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    credential: Option<ApiKey>,
    pub state: SessionState,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            credential: None,
            state: SessionState::default(),
        }
    }

    pub fn with_credential(api_key: ApiKey) -> Self {
        let mut session = Self::new();
        session.credential = Some(api_key);
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Store the user's key. Blank input is rejected and clears nothing.
    pub fn set_credential(&mut self, raw: &str) -> Result<(), TutorError> {
        self.credential = Some(ApiKey::new(raw)?);
        Ok(())
    }

    pub fn credential(&self) -> Option<&ApiKey> {
        self.credential.as_ref()
    }

    pub fn has_credential(&self) -> bool {
        self.credential.is_some()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new();
        assert!(!session.has_credential());
        assert_eq!(session.state, SessionState::default());
        assert!(session.state.history.is_empty());
    }

    #[test]
    fn test_blank_credential_rejected() {
        let mut session = Session::new();
        assert!(matches!(session.set_credential("  "), Err(TutorError::MissingCredential)));
        assert!(!session.has_credential());

        session.set_credential("gsk_live").unwrap();
        assert_eq!(session.credential().map(ApiKey::expose), Some("gsk_live"));
    }

    #[test]
    fn test_sessions_get_distinct_ids() {
        assert_ne!(Session::new().id(), Session::new().id());
    }
}
