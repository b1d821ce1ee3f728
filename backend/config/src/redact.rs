//! Config redaction: produce safe-to-display config snapshots by masking
//! credentials.

use crate::schema::HookforgeConfig;

/// Mask a secret, keeping a four character hint.
fn mask(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let hint: String = s.chars().take(4).collect();
    if s.chars().count() > 8 {
        format!("{hint}***")
    } else {
        "***".to_string()
    }
}

/// Display-safe copy of a config. The public key is not secret but is
/// shortened to keep output readable.
pub fn redact(config: &HookforgeConfig) -> HookforgeConfig {
    let mut safe = config.clone();
    safe.token = mask(&config.token);
    if config.public_key.chars().count() > 12 {
        let head: String = config.public_key.chars().take(12).collect();
        safe.public_key = format!("{head}...");
    }
    safe
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_token_and_shortens_key() {
        let config = HookforgeConfig {
            token: "MTIzNDU2.Gh7x.secretpart".into(),
            public_key: "ab".repeat(32),
            ..Default::default()
        };
        let safe = redact(&config);
        assert_eq!(safe.token, "MTIz***");
        assert!(!safe.public_key.contains(&"ab".repeat(10)));
        assert_eq!(safe.route, config.route);
    }

    #[test]
    fn short_secrets_are_fully_masked() {
        let config = HookforgeConfig { token: "abc".into(), ..Default::default() };
        assert_eq!(redact(&config).token, "***");
    }
}
