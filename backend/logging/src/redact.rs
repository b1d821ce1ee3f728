//! Log Redaction Layer
//!
//! Scrubs bot credentials and interaction tokens from strings prior to logging.

use once_cell::sync::Lazy;
use regex::Regex;

static AUTH_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(Bot|Bearer)\s+[A-Za-z0-9\-\._~+/]+=*").unwrap());

/// Bot tokens: three dot-separated base64url segments.
static BOT_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9_\-]{23,28}\.[A-Za-z0-9_\-]{6,7}\.[A-Za-z0-9_\-]{27,}").unwrap()
});

/// Interaction tokens embedded in webhook follow-up URLs.
static WEBHOOK_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(/webhooks/\d+/)[A-Za-z0-9_\-\.]+").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = AUTH_HEADER_RE.replace_all(input, "$1 [REDACTED_TOKEN]");
    let redacted = BOT_TOKEN_RE.replace_all(&redacted, "[REDACTED_TOKEN]");
    WEBHOOK_TOKEN_RE
        .replace_all(&redacted, "${1}[REDACTED_TOKEN]")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction() {
        let raw = "PUT failed with Authorization: Bot MTA5ODc2NTQzMjEwOTg3NjU0.GhIjKl.abcdefghijklmnopqrstuvwxyz0123";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("MTA5ODc2NTQzMjEwOTg3NjU0"));
        assert!(clean.contains("Bot [REDACTED_TOKEN]"));
    }

    #[test]
    fn bare_bot_token_is_redacted() {
        let raw = "token=MTA5ODc2NTQzMjEwOTg3NjU0.GhIjKl.abcdefghijklmnopqrstuvwxyz0123 rejected";
        assert_eq!(redact_sensitive_data(raw), "token=[REDACTED_TOKEN] rejected");
    }

    #[test]
    fn webhook_url_token_is_redacted() {
        let raw = "POST /webhooks/1234/aW50ZXJhY3Rpb246MTIzNDU2 -> 404";
        assert_eq!(redact_sensitive_data(raw), "POST /webhooks/1234/[REDACTED_TOKEN] -> 404");
    }
}
