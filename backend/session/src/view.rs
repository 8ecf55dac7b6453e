use serde::Serialize;

use mathmentor_core::ChatMessage;

use crate::state::{Notice, Session};

/// Read-only snapshot of a session, as shown by the TUI and returned by
/// the gateway.
///
/// Building a view never touches the session, so rendering it any number
/// of times shows the same thing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub has_credential: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_notice: Option<Notice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
    pub history: Vec<ChatMessage>,
}

impl SessionView {
    pub fn render(session: &Session) -> Self {
        let state = &session.state;
        Self {
            session_id: session.id().to_string(),
            has_credential: session.has_credential(),
            extracted_text: state.extracted_text.clone(),
            ocr_notice: state.ocr_notice.clone(),
            solution: state.solution.clone(),
            hint: state.hint.clone(),
            answer_feedback: state.answer_feedback.clone(),
            chat_reply: state.chat_reply.clone(),
            notice: state.notice.clone(),
            history: state.history.as_slice().to_vec(),
        }
    }

    /// Output sections in display order, skipping the empty ones.
    pub fn sections(&self) -> Vec<(&'static str, &str)> {
        [
            ("Extracted Problem", &self.extracted_text),
            ("Solution", &self.solution),
            ("Hint", &self.hint),
            ("Answer Feedback", &self.answer_feedback),
            ("AI Response", &self.chat_reply),
        ]
        .into_iter()
        .filter_map(|(title, body)| body.as_deref().map(|text| (title, text)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use mathmentor_core::ApiKey;

    use super::*;

    fn populated() -> Session {
        let mut session = Session::with_credential(ApiKey::new("gsk_view").unwrap());
        session.state.history.push_user("Problem: 1+1");
        session.state.history.push_assistant("2");
        session.state.solution = Some("2".into());
        session.state.chat_reply = Some("Addition combines quantities.".into());
        session
    }

    #[test]
    fn test_render_is_idempotent() {
        let session = populated();
        let before = session.state.clone();

        let first = SessionView::render(&session);
        let second = SessionView::render(&session);

        assert_eq!(first, second);
        assert_eq!(session.state, before);
    }

    #[test]
    fn test_sections_skip_empty_fields() {
        let view = SessionView::render(&populated());
        let titles: Vec<_> = view.sections().into_iter().map(|(title, _)| title).collect();
        assert_eq!(titles, vec!["Solution", "AI Response"]);
    }

    #[test]
    fn test_json_omits_empty_outputs_and_key() {
        let view = SessionView::render(&populated());
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["hasCredential"], true);
        assert_eq!(json["solution"], "2");
        assert!(json.get("hint").is_none());
        assert_eq!(json["history"][0]["role"], "user");
        assert!(!json.to_string().contains("gsk_view"));
    }
}
