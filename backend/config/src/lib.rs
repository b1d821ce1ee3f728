//! `hookforge-config`: runtime configuration for the HookForge server.
//!
//! Provides:
//! - Typed config schema with defaults
//! - YAML loading
//! - `${ENV_VAR}` substitution and `HOOKFORGE_*` overrides
//! - Validation with field paths
//! - Redaction for safe logging/display

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use env::{
    apply_env_overrides, apply_env_overrides_with, resolve_env_vars, resolve_env_vars_with,
    MissingEnvVarError,
};
pub use io::{config_dir, config_file_path, load_raw_config};
pub use redact::redact;
pub use schema::HookforgeConfig;
pub use validation::{validate, ConfigValidationError, ValidationReport};

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;

/// Load, substitute env vars, apply overrides, and validate a config file.
///
/// This is the main entry point for loading a config at runtime. Validation
/// errors abort; warnings are logged.
pub async fn load_and_prepare(path: &Path) -> Result<HookforgeConfig> {
    let raw = load_raw_config(path).await?;
    let config = prepare(&raw, resolve_env_vars, apply_env_overrides)?;

    let report = validate(&config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    if let Some(first) = report.errors.first() {
        bail!("invalid config ({} errors), first: {}", report.errors.len(), first);
    }

    Ok(config)
}

fn prepare(
    raw: &Value,
    substitute: impl Fn(&Value) -> Result<Value>,
    overrides: impl Fn(HookforgeConfig) -> Result<HookforgeConfig>,
) -> Result<HookforgeConfig> {
    let value = substitute(raw).context("Failed to resolve env vars in config")?;
    let config: HookforgeConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;
    overrides(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn pipeline_substitutes_then_overrides() {
        let env: HashMap<String, String> = [
            ("DISCORD_TOKEN", "from-file-ref"),
            ("HOOKFORGE_PORT", "7000"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let raw = json!({ "application_id": "1", "token": "${DISCORD_TOKEN}", "port": 8080 });

        let config = prepare(
            &raw,
            |v| resolve_env_vars_with(v, &env),
            |c| apply_env_overrides_with(c, &env),
        )
        .unwrap();

        assert_eq!(config.token, "from-file-ref");
        assert_eq!(config.port, 7000);
        assert_eq!(config.application_id, "1");
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let path = std::env::temp_dir().join(format!("hookforge-lib-{}.yaml", std::process::id()));
        tokio::fs::write(&path, "application_id: not-a-number\n").await.unwrap();

        let err = load_and_prepare(&path).await.unwrap_err();

        assert!(err.to_string().contains("invalid config"));
        let _ = tokio::fs::remove_file(&path).await;
    }
}
