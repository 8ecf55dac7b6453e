//! Tutor Event Logger
//!
//! Structured per-session events (actions, OCR results, errors) emitted on the
//! `tutor_events` target with secrets scrubbed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TutorEvent {
    ActionCompleted {
        action: String,
        history_len: usize,
    },
    ActionSkipped {
        action: String,
        reason: String,
    },
    ActionFailed {
        action: String,
        error_msg: String,
    },
    OcrFinished {
        outcome: String,
    },
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: TutorEvent,
}

impl EventLogEntry {
    /// Build an entry, scrubbing free-text fields first.
    pub fn new(session_id: &str, mut event: TutorEvent) -> Self {
        match &mut event {
            TutorEvent::ActionFailed { error_msg, .. } => {
                *error_msg = redact_sensitive_data(error_msg);
            }
            TutorEvent::ActionSkipped { reason, .. } => {
                *reason = redact_sensitive_data(reason);
            }
            TutorEvent::ActionCompleted { .. } | TutorEvent::OcrFinished { .. } => {}
        }
        Self {
            session_id: session_id.to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}

pub struct EventLogger;

impl EventLogger {
    /// Log a session event through the tracing system.
    pub fn log_event(session_id: &str, event: TutorEvent) {
        let entry = EventLogEntry::new(session_id, event);
        let json = serde_json::to_string(&entry).unwrap_or_default();
        info!(target: "tutor_events", session_id = %entry.session_id, event = %json, "Tutor event");
    }
}
