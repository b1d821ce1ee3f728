use hookforge_commands::ResolutionError;
use hookforge_core::HookError;
use thiserror::Error;

/// Why a dispatch ended before a handler produced a response.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("request signature rejected: {0}")]
    Unauthorized(#[from] hookforge_security::SignatureError),

    #[error("malformed interaction: {0}")]
    Malformed(#[from] HookError),

    #[error("{0} not found")]
    NotFound(String),

    #[error("checks failed")]
    CheckFailed,

    #[error("check contract violated: {0}")]
    CheckViolation(String),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("handler failed: {0:#}")]
    Handler(anyhow::Error),

    #[error("handler panicked")]
    HandlerPanicked,
}
