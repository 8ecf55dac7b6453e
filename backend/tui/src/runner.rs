//! Terminal event loop.
//!
//! Every tutor call is awaited inside the loop, so a session never has
//! more than one request in flight.

use std::io::{self, Stdout};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use mathmentor_core::ActionKind;
use mathmentor_session::{ActionInputs, ActionOutcome, Notice, Tutor};

use crate::app::AppState;
use crate::input::{handle_key_event, UiCommand};
use crate::render::draw_ui;

type Term = Terminal<CrosstermBackend<Stdout>>;

/// Run the tutor TUI until the user quits.
pub async fn run_tui(tutor: Tutor, api_key: Option<String>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let result = event_loop(&mut terminal, &tutor, api_key).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Term> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

async fn event_loop(terminal: &mut Term, tutor: &Tutor, api_key: Option<String>) -> Result<()> {
    let mut state = AppState::new();
    if let Some(key) = api_key {
        state.api_key = key;
        apply_command(tutor, &mut state, UiCommand::SetCredential).await;
    }

    while !state.should_quit {
        terminal.draw(|f| draw_ui(f, &state))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let command = handle_key_event(key, &mut state);
        if command == UiCommand::None {
            continue;
        }

        state.busy = true;
        terminal.draw(|f| draw_ui(f, &state))?;
        apply_command(tutor, &mut state, command).await;
        state.busy = false;
    }

    info!("TUI closed");
    Ok(())
}

/// Execute one command against the session and update the status line.
pub async fn apply_command(tutor: &Tutor, state: &mut AppState, command: UiCommand) {
    match command {
        UiCommand::None => {}
        UiCommand::SetCredential => match state.session.set_credential(&state.api_key) {
            Ok(()) => state.set_status(Notice::success("API key saved.")),
            Err(e) => state.set_status(Notice::error(e.to_string())),
        },
        UiCommand::RunOcr => run_ocr(tutor, state).await,
        UiCommand::Run(kind) => {
            let inputs = ActionInputs {
                problem: state.problem.clone(),
                answer: state.answer.clone(),
                message: state.follow_up.clone(),
            };
            match tutor.dispatch(&mut state.session, kind, &inputs).await {
                Ok(ActionOutcome::Completed(_)) => {
                    if kind == ActionKind::Chat {
                        state.follow_up.clear();
                    }
                    state.set_status(Notice::success(format!("{} done.", kind.label())));
                }
                Ok(ActionOutcome::Skipped(req)) => {
                    state.set_status(Notice::warning(capitalize(req.describe())));
                }
                Ok(ActionOutcome::Failed(err)) => {
                    state.set_status(Notice::error(err.display_text()));
                }
                Err(e) => state.set_status(Notice::error(e.to_string())),
            }
        }
    }
}

async fn run_ocr(tutor: &Tutor, state: &mut AppState) {
    let raw = state.image_path.trim().to_string();
    if raw.is_empty() {
        state.set_status(Notice::warning("Enter the path of an image first."));
        return;
    }
    let path = Path::new(&raw);

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read image");
            state.set_status(Notice::error(format!("Could not read {}: {e}", path.display())));
            return;
        }
    };

    let filename = path.file_name().and_then(|n| n.to_str());
    match tutor.upload_image(&mut state.session, filename, &bytes).await {
        Ok(outcome) => {
            let notice = state
                .session
                .state
                .ocr_notice
                .clone()
                .unwrap_or_else(|| Notice::warning(outcome.notice()));
            state.set_status(notice);
        }
        Err(e) => state.set_status(Notice::error(e.to_string())),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use image::{GrayImage, ImageFormat, Luma};
    use mathmentor_conversation::{ConversationClient, MockProvider};
    use mathmentor_session::NoticeLevel;
    use mathmentor_understanding::{OcrService, StaticOcrEngine};

    use super::*;

    fn tutor(provider: MockProvider, ocr_text: &str) -> Tutor {
        Tutor::new(
            ConversationClient::new(Arc::new(provider), "test-model"),
            OcrService::new(Arc::new(StaticOcrEngine::returning(ocr_text))),
        )
    }

    #[tokio::test]
    async fn test_set_credential_from_field() {
        let tutor = tutor(MockProvider::new("mock"), "");
        let mut state = AppState::new();

        apply_command(&tutor, &mut state, UiCommand::SetCredential).await;
        assert_eq!(state.status.as_ref().unwrap().level, NoticeLevel::Error);
        assert!(!state.session.has_credential());

        state.api_key = "gsk_tui_key".into();
        apply_command(&tutor, &mut state, UiCommand::SetCredential).await;
        assert!(state.session.has_credential());
    }

    #[tokio::test]
    async fn test_chat_clears_follow_up_on_success() {
        let tutor = tutor(MockProvider::new("mock").then_reply("Because it cancels."), "");
        let mut state = AppState::new();
        state.session.set_credential("gsk_tui_key").unwrap();
        state.follow_up = "why divide?".into();

        apply_command(&tutor, &mut state, UiCommand::Run(ActionKind::Chat)).await;

        assert!(state.follow_up.is_empty());
        assert_eq!(state.session.state.chat_reply.as_deref(), Some("Because it cancels."));
        assert_eq!(state.status.as_ref().unwrap().text, "Send done.");
    }

    #[tokio::test]
    async fn test_skipped_action_warns() {
        let tutor = tutor(MockProvider::new("mock"), "");
        let mut state = AppState::new();
        state.session.set_credential("gsk_tui_key").unwrap();
        state.problem = "2x = 4".into();

        apply_command(&tutor, &mut state, UiCommand::Run(ActionKind::Check)).await;

        let status = state.status.as_ref().unwrap();
        assert_eq!(status.level, NoticeLevel::Warning);
        assert_eq!(status.text, "An answer is required");
    }

    #[tokio::test]
    async fn test_ocr_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("problem.png");
        GrayImage::from_pixel(16, 16, Luma([230]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let tutor = tutor(MockProvider::new("mock"), "7 + 5 = ?");
        let mut state = AppState::new();
        state.session.set_credential("gsk_tui_key").unwrap();
        state.image_path = path.display().to_string();

        apply_command(&tutor, &mut state, UiCommand::RunOcr).await;

        assert_eq!(state.session.state.extracted_text.as_deref(), Some("7 + 5 = ?"));
        assert_eq!(state.status.as_ref().unwrap().level, NoticeLevel::Success);
    }

    #[tokio::test]
    async fn test_missing_image_file() {
        let tutor = tutor(MockProvider::new("mock"), "unused");
        let mut state = AppState::new();
        state.session.set_credential("gsk_tui_key").unwrap();
        state.image_path = "/definitely/not/here.png".into();

        apply_command(&tutor, &mut state, UiCommand::RunOcr).await;

        assert_eq!(state.status.as_ref().unwrap().level, NoticeLevel::Error);
        assert!(state.session.state.extracted_text.is_none());
    }
}
