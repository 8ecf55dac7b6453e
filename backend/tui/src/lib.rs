//! Terminal front end for MathMentor.
//!
//! Exposes the ratatui form, its key handling and the event loop behind
//! `mathmentor tui`.

pub mod app;
pub mod input;
pub mod render;
pub mod runner;

pub use app::{AppState, Field};
pub use input::{handle_key_event, UiCommand};
pub use render::draw_ui;
pub use runner::{apply_command, run_tui};
