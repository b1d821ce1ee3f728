//! Structured logging for HookForge.
//!
//! Handles subscriber setup (console + rolling NDJSON file), secret
//! redaction, and the per-interaction event log.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{InteractionEvent, InteractionEventLogger};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
