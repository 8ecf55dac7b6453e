//! TUI App State
//!
//! Holds the tutor session plus everything the terminal form needs:
//! the text in each input box, which box has focus, and the status line.

use mathmentor_session::{Notice, Session};

/// An editable input box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ApiKey,
    ImagePath,
    Problem,
    Answer,
    FollowUp,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::ApiKey,
        Field::ImagePath,
        Field::Problem,
        Field::Answer,
        Field::FollowUp,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Field::ApiKey => "API Key (Enter to save)",
            Field::ImagePath => "Image path: png/jpg/jpeg (Enter to read)",
            Field::Problem => "Math problem",
            Field::Answer => "Your answer",
            Field::FollowUp => "Ask a follow-up (Enter to send)",
        }
    }

    fn index(self) -> usize {
        Field::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Field {
        Field::ALL[(self.index() + 1) % Field::ALL.len()]
    }

    pub fn prev(self) -> Field {
        Field::ALL[(self.index() + Field::ALL.len() - 1) % Field::ALL.len()]
    }
}

pub struct AppState {
    pub session: Session,
    pub focus: Field,
    pub api_key: String,
    pub image_path: String,
    pub problem: String,
    pub answer: String,
    pub follow_up: String,
    pub status: Option<Notice>,
    /// Set while a request is in flight.
    pub busy: bool,
    pub should_quit: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            session: Session::new(),
            focus: Field::ApiKey,
            api_key: String::new(),
            image_path: String::new(),
            problem: String::new(),
            answer: String::new(),
            follow_up: String::new(),
            status: Some(Notice::warning("Enter your API key to start.")),
            busy: false,
            should_quit: false,
        }
    }

    pub fn input(&self, field: Field) -> &str {
        match field {
            Field::ApiKey => &self.api_key,
            Field::ImagePath => &self.image_path,
            Field::Problem => &self.problem,
            Field::Answer => &self.answer,
            Field::FollowUp => &self.follow_up,
        }
    }

    pub fn input_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::ApiKey => &mut self.api_key,
            Field::ImagePath => &mut self.image_path,
            Field::Problem => &mut self.problem,
            Field::Answer => &mut self.answer,
            Field::FollowUp => &mut self.follow_up,
        }
    }

    pub fn set_status(&mut self, notice: Notice) {
        self.status = Some(notice);
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
