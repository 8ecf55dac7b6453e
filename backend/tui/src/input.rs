//! Keyboard Input Handler
//!
//! Turns crossterm key events into edits on `AppState` and, where a key
//! asks for tutor work, a [`UiCommand`] for the runner to execute.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use mathmentor_core::ActionKind;
use mathmentor_session::Notice;

use crate::app::{AppState, Field};

/// Work requested by a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    None,
    SetCredential,
    RunOcr,
    Run(ActionKind),
}

/// Handles a single keyboard event.
pub fn handle_key_event(key: KeyEvent, state: &mut AppState) -> UiCommand {
    if state.busy {
        return UiCommand::None;
    }

    let command = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.should_quit = true;
            UiCommand::None
        }
        KeyCode::Esc => {
            state.should_quit = true;
            UiCommand::None
        }
        KeyCode::Tab => {
            state.focus = state.focus.next();
            UiCommand::None
        }
        KeyCode::BackTab => {
            state.focus = state.focus.prev();
            UiCommand::None
        }
        KeyCode::F(2) => UiCommand::Run(ActionKind::Solve),
        KeyCode::F(3) => UiCommand::Run(ActionKind::Hint),
        KeyCode::F(4) => UiCommand::Run(ActionKind::Check),
        KeyCode::Enter => match state.focus {
            Field::ApiKey => UiCommand::SetCredential,
            Field::ImagePath => UiCommand::RunOcr,
            Field::FollowUp => UiCommand::Run(ActionKind::Chat),
            Field::Problem | Field::Answer => {
                state.focus = state.focus.next();
                UiCommand::None
            }
        },
        KeyCode::Backspace => {
            state.input_mut(state.focus).pop();
            UiCommand::None
        }
        KeyCode::Char(c) => {
            state.input_mut(state.focus).push(c);
            UiCommand::None
        }
        _ => UiCommand::None,
    };

    gate(command, state)
}

/// Everything except saving the key waits for a key to be saved.
fn gate(command: UiCommand, state: &mut AppState) -> UiCommand {
    match command {
        UiCommand::RunOcr | UiCommand::Run(_) if !state.session.has_credential() => {
            state.set_status(Notice::warning("Enter your API key first."));
            UiCommand::None
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            handle_key_event(press(KeyCode::Char(c)), state);
        }
    }

    fn keyed_state() -> AppState {
        let mut state = AppState::new();
        state.session.set_credential("gsk_tui").unwrap();
        state
    }

    #[test]
    fn test_typing_goes_to_focused_field() {
        let mut state = AppState::new();
        state.focus = Field::Problem;
        type_text(&mut state, "2x+3=7");
        handle_key_event(press(KeyCode::Backspace), &mut state);
        assert_eq!(state.problem, "2x+3=");
        assert!(state.api_key.is_empty());
    }

    #[test]
    fn test_enter_on_key_field_requests_credential() {
        let mut state = AppState::new();
        type_text(&mut state, "gsk_abc");
        assert_eq!(handle_key_event(press(KeyCode::Enter), &mut state), UiCommand::SetCredential);
    }

    #[test]
    fn test_actions_gated_without_key() {
        let mut state = AppState::new();
        assert_eq!(handle_key_event(press(KeyCode::F(2)), &mut state), UiCommand::None);
        assert!(state.status.as_ref().unwrap().text.contains("API key"));
    }

    #[test]
    fn test_function_keys_map_to_actions() {
        let mut state = keyed_state();
        assert_eq!(handle_key_event(press(KeyCode::F(2)), &mut state), UiCommand::Run(ActionKind::Solve));
        assert_eq!(handle_key_event(press(KeyCode::F(3)), &mut state), UiCommand::Run(ActionKind::Hint));
        assert_eq!(handle_key_event(press(KeyCode::F(4)), &mut state), UiCommand::Run(ActionKind::Check));
    }

    #[test]
    fn test_enter_depends_on_focus() {
        let mut state = keyed_state();
        state.focus = Field::ImagePath;
        assert_eq!(handle_key_event(press(KeyCode::Enter), &mut state), UiCommand::RunOcr);

        state.focus = Field::FollowUp;
        assert_eq!(handle_key_event(press(KeyCode::Enter), &mut state), UiCommand::Run(ActionKind::Chat));

        state.focus = Field::Problem;
        assert_eq!(handle_key_event(press(KeyCode::Enter), &mut state), UiCommand::None);
        assert_eq!(state.focus, Field::Answer);
    }

    #[test]
    fn test_quit_keys_and_busy() {
        let mut state = AppState::new();
        handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), &mut state);
        assert!(state.should_quit);
        assert!(state.api_key.is_empty());

        let mut state = keyed_state();
        state.busy = true;
        assert_eq!(handle_key_event(press(KeyCode::F(2)), &mut state), UiCommand::None);

        state.busy = false;
        handle_key_event(press(KeyCode::BackTab), &mut state);
        assert_eq!(state.focus, Field::FollowUp);
        handle_key_event(press(KeyCode::Esc), &mut state);
        assert!(state.should_quit);
    }
}
