use thiserror::Error;

/// Top-level error type for the HookForge wire model.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("unknown {kind} discriminator: {value}")]
    UnknownDiscriminator { kind: &'static str, value: u8 },

    #[error("interaction of type {0} carried no data")]
    MissingData(&'static str),

    #[error("malformed interaction payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
