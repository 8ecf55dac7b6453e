//! Telemetry and structured logging for MathMentor.
//!
//! Handles log redaction, console/file subscriber setup, and tutor event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, TutorEvent};
pub use logger::{init_logger, LogOutput};
pub use redact::redact_sensitive_data;
