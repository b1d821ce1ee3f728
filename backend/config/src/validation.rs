//! Config validation with field paths and user-friendly messages.

use crate::schema::HookforgeConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// Everything found in one validation pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError { path: path.into(), message: message.into() });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError { path: path.into(), message: message.into() });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &HookforgeConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_credentials(config, &mut report);
    validate_server(config, &mut report);
    validate_messages(config, &mut report);
    report
}

fn is_snowflake(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn validate_credentials(config: &HookforgeConfig, report: &mut ValidationReport) {
    if !is_snowflake(&config.application_id) {
        report.error("application_id", "Application id must be a numeric snowflake");
    }
    if config.public_key.len() != 64 || !config.public_key.bytes().all(|b| b.is_ascii_hexdigit()) {
        report.error("public_key", "Public key must be 64 hex characters");
    }
    if config.token.trim().is_empty() {
        report.error("token", "Bot token cannot be empty");
    }
    if let Some(channel) = &config.sync_log_channel_id {
        if !is_snowflake(channel) {
            report.error("sync_log_channel_id", "Channel id must be a numeric snowflake");
        }
    }
}

fn validate_server(config: &HookforgeConfig, report: &mut ValidationReport) {
    if !config.route.starts_with('/') {
        report.error("route", "Route must start with '/'");
    }
    if config.port == 0 {
        report.error("port", "Port cannot be 0");
    }
    if !config.api_base.starts_with("https://") {
        report.warn("api_base", "API base is not HTTPS; the bot token will be sent in clear text");
    }
}

fn validate_messages(config: &HookforgeConfig, report: &mut ValidationReport) {
    for (path, text) in [
        ("not_found_message", &config.not_found_message),
        ("check_failed_message", &config.check_failed_message),
        ("error_message", &config.error_message),
    ] {
        if text.trim().is_empty() {
            report.warn(path, "Empty response text; the platform rejects empty messages");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> HookforgeConfig {
        HookforgeConfig {
            application_id: "123456789012345678".into(),
            public_key: "ab".repeat(32),
            token: "bot-token".into(),
            ..Default::default()
        }
    }

    #[test]
    fn complete_config_is_valid() {
        let report = validate(&valid());
        assert!(report.is_valid(), "{:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn default_config_reports_every_missing_credential() {
        let report = validate(&HookforgeConfig::default());
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["application_id", "public_key", "token"]);
    }

    #[test]
    fn rejects_bad_route_and_key() {
        let mut config = valid();
        config.route = "interactions".into();
        config.public_key = "zz".repeat(32);
        let report = validate(&config);
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn plain_http_api_is_a_warning() {
        let mut config = valid();
        config.api_base = "http://localhost:3000".into();
        let report = validate(&config);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].path, "api_base");
    }
}
