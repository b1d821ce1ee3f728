//! Interaction Event Logger
//!
//! One structured record per dispatched interaction, on the
//! `interaction_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, Serialize)]
pub struct InteractionEvent {
    pub request_id: String,
    /// Platform interaction id, once the body has been parsed.
    pub interaction_id: Option<String>,
    pub kind: String,
    /// Terminal dispatch state.
    pub state: String,
    pub status: u16,
    pub latency_ms: u64,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InteractionLogEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: InteractionEvent,
}

pub struct InteractionEventLogger;

impl InteractionEventLogger {
    /// Redacts the error text and emits the event through `tracing`.
    pub fn log_event(mut event: InteractionEvent) -> InteractionLogEntry {
        if let Some(error) = event.error.as_mut() {
            *error = redact_sensitive_data(error);
        }

        let entry = InteractionLogEntry { timestamp: Utc::now(), event };

        info!(
            target: "interaction_events",
            request_id = %entry.event.request_id,
            interaction_id = entry.event.interaction_id.as_deref().unwrap_or("-"),
            kind = %entry.event.kind,
            state = %entry.event.state,
            status = entry.event.status,
            latency_ms = entry.event.latency_ms,
            error = entry.event.error.as_deref().unwrap_or(""),
            "Interaction dispatched"
        );
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_text_is_redacted() {
        let entry = InteractionEventLogger::log_event(InteractionEvent {
            request_id: "r".into(),
            interaction_id: Some("1".into()),
            kind: "ApplicationCommand".into(),
            state: "HandlerFailed".into(),
            status: 200,
            latency_ms: 3,
            error: Some("upstream said Bearer abc.def".into()),
        });
        assert_eq!(entry.event.error.as_deref(), Some("upstream said Bearer [REDACTED_TOKEN]"));
    }
}
