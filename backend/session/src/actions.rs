//! The action table.
//!
//! Each tutor action is described once: what it needs before it may call
//! the API, and which session field its reply lands in. The [`Tutor`]
//! drives every action through the same path using this table.
//!
//! [`Tutor`]: crate::Tutor

use serde::{Deserialize, Serialize};

use mathmentor_conversation::PromptInput;
use mathmentor_core::{ActionKind, CompletionError, Requirement};

use crate::state::SessionState;

/// Where an action's reply is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputField {
    Solution,
    Hint,
    AnswerFeedback,
    ChatReply,
}

impl OutputField {
    pub fn slot(self, state: &mut SessionState) -> &mut Option<String> {
        match self {
            OutputField::Solution => &mut state.solution,
            OutputField::Hint => &mut state.hint,
            OutputField::AnswerFeedback => &mut state.answer_feedback,
            OutputField::ChatReply => &mut state.chat_reply,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ActionSpec {
    pub kind: ActionKind,
    pub requires: &'static [Requirement],
    pub output: OutputField,
}

pub const ACTION_TABLE: [ActionSpec; 4] = [
    ActionSpec {
        kind: ActionKind::Solve,
        requires: &[Requirement::Problem],
        output: OutputField::Solution,
    },
    ActionSpec {
        kind: ActionKind::Hint,
        requires: &[Requirement::Problem],
        output: OutputField::Hint,
    },
    ActionSpec {
        kind: ActionKind::Check,
        requires: &[Requirement::Problem, Requirement::Answer],
        output: OutputField::AnswerFeedback,
    },
    ActionSpec {
        kind: ActionKind::Chat,
        requires: &[Requirement::ChatText],
        output: OutputField::ChatReply,
    },
];

impl ActionSpec {
    pub fn for_kind(kind: ActionKind) -> &'static ActionSpec {
        // ACTION_TABLE lists every ActionKind in declaration order.
        &ACTION_TABLE[kind as usize]
    }

    /// First requirement `inputs` does not satisfy, if any.
    pub fn missing(&self, inputs: &ResolvedInputs<'_>) -> Option<Requirement> {
        self.requires.iter().copied().find(|req| match req {
            Requirement::Problem => inputs.problem.is_empty(),
            Requirement::Answer => inputs.answer.is_empty(),
            Requirement::ChatText => inputs.message.trim().is_empty(),
        })
    }

    pub fn prompt_input<'a>(&self, inputs: &ResolvedInputs<'a>) -> PromptInput<'a> {
        match self.kind {
            ActionKind::Solve => PromptInput::Solve { problem: inputs.problem },
            ActionKind::Hint => PromptInput::Hint { problem: inputs.problem },
            ActionKind::Check => PromptInput::Check {
                problem: inputs.problem,
                answer: inputs.answer,
            },
            ActionKind::Chat => PromptInput::Chat { message: inputs.message },
        }
    }
}

/// Raw text fields submitted with an action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActionInputs {
    /// Manually typed problem. Takes precedence over OCR text when non-blank.
    pub problem: String,
    pub answer: String,
    pub message: String,
}

impl ActionInputs {
    pub fn problem(problem: impl Into<String>) -> Self {
        Self { problem: problem.into(), ..Self::default() }
    }

    pub fn check(problem: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            problem: problem.into(),
            answer: answer.into(),
            ..Self::default()
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self { message: message.into(), ..Self::default() }
    }

    /// Apply the problem-source rule against the session's OCR text.
    pub fn resolve<'a>(&'a self, state: &'a SessionState) -> ResolvedInputs<'a> {
        let typed = self.problem.trim();
        let problem = if typed.is_empty() {
            state.extracted_text.as_deref().map(str::trim).unwrap_or("")
        } else {
            typed
        };
        ResolvedInputs {
            problem,
            answer: self.answer.trim(),
            message: &self.message,
        }
    }
}

/// Inputs after trimming and problem-source resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedInputs<'a> {
    pub problem: &'a str,
    pub answer: &'a str,
    /// Follow-up text, kept verbatim.
    pub message: &'a str,
}

/// What happened when an action was triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// A precondition failed; no request was made and nothing changed.
    Skipped(Requirement),
    Completed(String),
    /// The request failed; the error notice is set and outputs are untouched.
    Failed(CompletionError),
}

impl ActionOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, ActionOutcome::Completed(_))
    }
}
