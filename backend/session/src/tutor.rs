use tracing::{info, warn};

use mathmentor_conversation::ConversationClient;
use mathmentor_core::{ActionKind, TutorError};
use mathmentor_logging::{EventLogger, TutorEvent};
use mathmentor_understanding::{OcrOutcome, OcrService};

use crate::actions::{ActionInputs, ActionOutcome, ActionSpec};
use crate::state::{Notice, Session};

/// Runs tutor actions against a session.
///
/// Stateless apart from its collaborators, so one `Tutor` can serve any
/// number of sessions concurrently.
#[derive(Clone)]
pub struct Tutor {
    client: ConversationClient,
    ocr: OcrService,
}

impl Tutor {
    pub fn new(client: ConversationClient, ocr: OcrService) -> Self {
        Self { client, ocr }
    }

    pub fn client(&self) -> &ConversationClient {
        &self.client
    }

    pub fn ocr(&self) -> &OcrService {
        &self.ocr
    }

    /// Run one action.
    ///
    /// Returns `Err(MissingCredential)` before looking at anything else when
    /// the session has no key. A failed precondition is `Ok(Skipped)` and
    /// leaves the session untouched.
    pub async fn dispatch(
        &self,
        session: &mut Session,
        kind: ActionKind,
        inputs: &ActionInputs,
    ) -> Result<ActionOutcome, TutorError> {
        let api_key = session.credential().cloned().ok_or(TutorError::MissingCredential)?;
        let session_id = session.id().to_string();
        let entry = ActionSpec::for_kind(kind);

        let state = &mut session.state;
        let resolved = inputs.resolve(state);
        if let Some(missing) = entry.missing(&resolved) {
            EventLogger::log_event(
                &session_id,
                TutorEvent::ActionSkipped {
                    action: kind.to_string(),
                    reason: missing.describe().to_string(),
                },
            );
            return Ok(ActionOutcome::Skipped(missing));
        }

        let prompt = entry.prompt_input(&resolved).render();

        match self.client.send(&api_key, &prompt, &mut state.history).await {
            Ok(reply) => {
                *entry.output.slot(state) = Some(reply.clone());
                state.notice = None;
                info!(session_id = %session_id, action = %kind, "Action completed");
                EventLogger::log_event(
                    &session_id,
                    TutorEvent::ActionCompleted {
                        action: kind.to_string(),
                        history_len: state.history.len(),
                    },
                );
                Ok(ActionOutcome::Completed(reply))
            }
            Err(error) => {
                warn!(session_id = %session_id, action = %kind, error = %error, "Action failed");
                state.notice = Some(Notice::error(error.display_text()));
                EventLogger::log_event(
                    &session_id,
                    TutorEvent::ActionFailed {
                        action: kind.to_string(),
                        error_msg: error.to_string(),
                    },
                );
                Ok(ActionOutcome::Failed(error))
            }
        }
    }

    /// Run OCR on an uploaded image and record the result on the session.
    ///
    /// A successful extraction replaces `extracted_text`; any other outcome
    /// clears it so a stale problem is never answered.
    pub async fn upload_image(
        &self,
        session: &mut Session,
        filename: Option<&str>,
        bytes: &[u8],
    ) -> Result<OcrOutcome, TutorError> {
        if !session.has_credential() {
            return Err(TutorError::MissingCredential);
        }

        let outcome = self.ocr.extract(filename, bytes).await;
        let state = &mut session.state;
        state.extracted_text = outcome.text().map(str::to_string);
        state.ocr_notice = Some(match &outcome {
            OcrOutcome::Extracted(_) => Notice::success(outcome.notice()),
            OcrOutcome::Unreadable => Notice::warning(outcome.notice()),
            OcrOutcome::Failed(_) => Notice::error(outcome.notice()),
        });

        let label = match &outcome {
            OcrOutcome::Extracted(_) => "extracted",
            OcrOutcome::Unreadable => "unreadable",
            OcrOutcome::Failed(_) => "failed",
        };
        EventLogger::log_event(
            &session.id().to_string(),
            TutorEvent::OcrFinished { outcome: label.to_string() },
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use image::{ImageFormat, RgbImage};
    use mathmentor_conversation::MockProvider;
    use mathmentor_core::{ApiKey, CompletionError, Requirement, Role};
    use mathmentor_understanding::StaticOcrEngine;

    use super::*;
    use crate::state::NoticeLevel;

    fn tutor_with(provider: Arc<MockProvider>, engine: Arc<StaticOcrEngine>) -> Tutor {
        Tutor::new(
            ConversationClient::new(provider, "test-model"),
            OcrService::new(engine),
        )
    }

    fn keyed_session() -> Session {
        Session::with_credential(ApiKey::new("gsk_test").unwrap())
    }

    fn png_bytes() -> Vec<u8> {
        let img = RgbImage::from_fn(12, 8, |x, _| image::Rgb([(x * 20) as u8; 3]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn test_empty_problem_makes_no_call() {
        let provider = Arc::new(MockProvider::new("mock"));
        let tutor = tutor_with(provider.clone(), Arc::new(StaticOcrEngine::returning("")));
        let mut session = keyed_session();

        let outcome = tutor
            .dispatch(&mut session, ActionKind::Solve, &ActionInputs::problem(""))
            .await
            .unwrap();

        assert_eq!(outcome, ActionOutcome::Skipped(Requirement::Problem));
        assert_eq!(provider.call_count(), 0);
        assert!(session.state.solution.is_none());
        assert!(session.state.history.is_empty());
    }

    #[tokio::test]
    async fn test_solve_records_history_and_solution() {
        let provider = Arc::new(MockProvider::new("mock").then_reply("Subtract 3, then divide by 2: x = 2."));
        let tutor = tutor_with(provider.clone(), Arc::new(StaticOcrEngine::returning("")));
        let mut session = keyed_session();

        let outcome = tutor
            .dispatch(&mut session, ActionKind::Solve, &ActionInputs::problem("Solve 2x+3=7"))
            .await
            .unwrap();

        assert!(outcome.is_completed());
        let state = &session.state;
        assert_eq!(state.history.len(), 2);
        assert_eq!(state.history.as_slice()[0].content, "Problem: Solve 2x+3=7");
        let last = state.history.last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(state.solution.as_deref(), Some(last.content.as_str()));

        let sent = provider.requests();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].messages[0].content.contains("**Problem:** Solve 2x+3=7"));
    }

    #[tokio::test]
    async fn test_check_sets_feedback_and_appends() {
        let provider = Arc::new(
            MockProvider::new("mock")
                .then_reply("Here is the solution.")
                .then_reply("Correct! x = 2 satisfies the equation."),
        );
        let tutor = tutor_with(provider.clone(), Arc::new(StaticOcrEngine::returning("")));
        let mut session = keyed_session();

        tutor
            .dispatch(&mut session, ActionKind::Solve, &ActionInputs::problem("Solve 2x+3=7"))
            .await
            .unwrap();
        let before = session.state.history.len();

        tutor
            .dispatch(&mut session, ActionKind::Check, &ActionInputs::check("Solve 2x+3=7", "x=2"))
            .await
            .unwrap();

        assert_eq!(session.state.history.len(), before + 2);
        assert_eq!(
            session.state.answer_feedback.as_deref(),
            Some("Correct! x = 2 satisfies the equation.")
        );
        // Earlier output survives.
        assert_eq!(session.state.solution.as_deref(), Some("Here is the solution."));

        // The second request carried the first exchange as context.
        let sent = provider.requests();
        assert_eq!(sent[1].messages.len(), 3);
        assert!(sent[1].messages[2].content.contains("**Student's Answer:** x=2"));
    }

    #[tokio::test]
    async fn test_failure_sets_notice_and_keeps_outputs() {
        let provider = Arc::new(
            MockProvider::new("mock")
                .then_reply("First solution")
                .then_fail(CompletionError::from_status(401, "invalid api key")),
        );
        let tutor = tutor_with(provider, Arc::new(StaticOcrEngine::returning("")));
        let mut session = keyed_session();
        let inputs = ActionInputs::problem("x^2 = 4");

        tutor.dispatch(&mut session, ActionKind::Solve, &inputs).await.unwrap();
        let outcome = tutor.dispatch(&mut session, ActionKind::Solve, &inputs).await.unwrap();

        assert!(matches!(outcome, ActionOutcome::Failed(CompletionError::Auth { status: 401, .. })));
        assert_eq!(session.state.solution.as_deref(), Some("First solution"));
        assert_eq!(session.state.history.len(), 2);
        let notice = session.state.notice.as_ref().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.text.contains("invalid api key"));
    }

    #[tokio::test]
    async fn test_missing_credential_blocks_everything() {
        let provider = Arc::new(MockProvider::new("mock"));
        let engine = Arc::new(StaticOcrEngine::returning("2+2"));
        let tutor = tutor_with(provider.clone(), engine.clone());
        let mut session = Session::new();

        let err = tutor
            .dispatch(&mut session, ActionKind::Hint, &ActionInputs::problem("2+2"))
            .await
            .unwrap_err();
        assert!(matches!(err, TutorError::MissingCredential));

        let err = tutor.upload_image(&mut session, Some("p.png"), &png_bytes()).await.unwrap_err();
        assert!(matches!(err, TutorError::MissingCredential));

        assert_eq!(provider.call_count(), 0);
        assert_eq!(engine.calls(), 0);
    }

    #[tokio::test]
    async fn test_ocr_text_used_when_problem_blank() {
        let provider = Arc::new(MockProvider::new("mock").then_reply("Try isolating x."));
        let tutor = tutor_with(provider.clone(), Arc::new(StaticOcrEngine::returning("  5x - 5 = 20 \n")));
        let mut session = keyed_session();

        let outcome = tutor
            .upload_image(&mut session, Some("worksheet.png"), &png_bytes())
            .await
            .unwrap();
        assert_eq!(outcome, OcrOutcome::Extracted("5x - 5 = 20".into()));
        assert_eq!(session.state.extracted_text.as_deref(), Some("5x - 5 = 20"));
        assert_eq!(session.state.ocr_notice.as_ref().unwrap().level, NoticeLevel::Success);

        tutor
            .dispatch(&mut session, ActionKind::Hint, &ActionInputs::problem(""))
            .await
            .unwrap();

        assert_eq!(session.state.history.as_slice()[0].content, "Hint request: 5x - 5 = 20");
        assert_eq!(session.state.hint.as_deref(), Some("Try isolating x."));
    }

    #[tokio::test]
    async fn test_unreadable_upload_clears_previous_text() {
        let tutor = tutor_with(
            Arc::new(MockProvider::new("mock")),
            Arc::new(StaticOcrEngine::returning("   ")),
        );
        let mut session = keyed_session();
        session.state.extracted_text = Some("old problem".into());

        let outcome = tutor.upload_image(&mut session, Some("blurry.png"), &png_bytes()).await.unwrap();

        assert_eq!(outcome, OcrOutcome::Unreadable);
        assert!(session.state.extracted_text.is_none());
        assert_eq!(session.state.ocr_notice.as_ref().unwrap().level, NoticeLevel::Warning);
    }

    #[tokio::test]
    async fn test_chat_uses_message_verbatim() {
        let provider = Arc::new(MockProvider::new("mock").then_reply("Because 3 is added to 2x."));
        let tutor = tutor_with(provider.clone(), Arc::new(StaticOcrEngine::returning("")));
        let mut session = keyed_session();

        tutor
            .dispatch(&mut session, ActionKind::Chat, &ActionInputs::message("why subtract 3 first?"))
            .await
            .unwrap();

        assert_eq!(provider.requests()[0].messages[0].content, "why subtract 3 first?");
        assert_eq!(session.state.chat_reply.as_deref(), Some("Because 3 is added to 2x."));
        assert_eq!(session.state.history.count_role(Role::User), 1);
    }
}
