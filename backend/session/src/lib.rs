//! Session state and the tutor's action handlers.
//!
//! A [`Session`] is owned by whoever hosts the user interaction (the TUI
//! loop, or the gateway's registry) and is passed by `&mut` into every
//! [`Tutor`] call. Nothing here is global.

pub mod actions;
pub mod state;
pub mod tutor;
pub mod view;

pub use actions::{ActionInputs, ActionOutcome, ActionSpec, OutputField, ACTION_TABLE};
pub use state::{Notice, NoticeLevel, Session, SessionState};
pub use tutor::Tutor;
pub use view::SessionView;
