//! Environment handling for config values.
//!
//! Two passes: `${VAR_NAME}` substitution inside string values of the raw
//! file, then `HOOKFORGE_*` variables overriding typed fields. Only
//! uppercase `[A-Z_][A-Z0-9_]*` names are substituted and `$${VAR}` escapes
//! to a literal `${VAR}`.

use anyhow::{bail, Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::schema::HookforgeConfig;

/// A reference, optionally preceded by the `$` escape.
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

pub const ENV_PREFIX: &str = "HOOKFORGE_";

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references in a config value tree using the process
/// environment. Any referenced variable that is unset or empty is an error.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    substitute_value(value, &std::env::vars().collect(), "")
}

/// Substitute env vars using a provided map.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => {
            let result: Result<Vec<_>> = arr
                .iter()
                .enumerate()
                .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
                .collect();
            Ok(Value::Array(result?))
        }
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &regex::Captures| {
        let var_name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

// ---------------------------------------------------------------------------
// HOOKFORGE_* overrides
// ---------------------------------------------------------------------------

/// Apply `HOOKFORGE_*` overrides from the process environment.
pub fn apply_env_overrides(config: HookforgeConfig) -> Result<HookforgeConfig> {
    apply_env_overrides_with(config, &std::env::vars().collect())
}

/// Apply `HOOKFORGE_*` overrides from a provided map.
pub fn apply_env_overrides_with(
    mut config: HookforgeConfig,
    env: &HashMap<String, String>,
) -> Result<HookforgeConfig> {
    let get = |name: &str| {
        env.get(&format!("{ENV_PREFIX}{name}"))
            .filter(|v| !v.is_empty())
            .cloned()
    };

    let strings: [(&str, &mut String); 8] = [
        ("APPLICATION_ID", &mut config.application_id),
        ("PUBLIC_KEY", &mut config.public_key),
        ("TOKEN", &mut config.token),
        ("ROUTE", &mut config.route),
        ("BIND_ADDRESS", &mut config.bind_address),
        ("API_BASE", &mut config.api_base),
        ("LOG_LEVEL", &mut config.log_level),
        ("LOG_DIR", &mut config.log_dir),
    ];
    for (name, field) in strings {
        if let Some(value) = get(name) {
            debug!("[Config] {}{} overrides file value", ENV_PREFIX, name);
            *field = value;
        }
    }

    if let Some(port) = get("PORT") {
        config.port = port
            .parse()
            .with_context(|| format!("{ENV_PREFIX}PORT is not a port number: {port}"))?;
    }
    if let Some(flag) = get("SYNC_ON_STARTUP") {
        config.sync_on_startup = parse_bool(&flag)
            .with_context(|| format!("{ENV_PREFIX}SYNC_ON_STARTUP is not a boolean: {flag}"))?;
    }
    if let Some(channel) = get("SYNC_LOG_CHANNEL_ID") {
        config.sync_log_channel_id = Some(channel);
    }

    Ok(config)
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_simple_var() {
        let v = json!({"token": "${BOT_TOKEN}"});
        let result = resolve_env_vars_with(&v, &env(&[("BOT_TOKEN", "abc.def")])).unwrap();
        assert_eq!(result["token"], "abc.def");
    }

    #[test]
    fn error_on_missing_var() {
        let v = json!({"token": "${MISSING_VAR}"});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err();
        assert!(err.to_string().contains("MISSING_VAR"));
        assert!(err.to_string().contains("token"));
    }

    #[test]
    fn escaped_reference_is_literal() {
        let v = json!({"not_found_message": "use $${NAME} literally"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["not_found_message"], "use ${NAME} literally");
    }

    #[test]
    fn lowercase_names_are_not_substituted() {
        let v = json!({"route": "/${path}"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["route"], "/${path}");
    }

    #[test]
    fn overrides_replace_file_values() {
        let config = apply_env_overrides_with(
            HookforgeConfig::default(),
            &env(&[("HOOKFORGE_TOKEN", "t0k"), ("HOOKFORGE_PORT", "9100"), ("HOOKFORGE_SYNC_ON_STARTUP", "no")]),
        )
        .unwrap();
        assert_eq!(config.token, "t0k");
        assert_eq!(config.port, 9100);
        assert!(!config.sync_on_startup);
        assert_eq!(config.route, "/interactions");
    }

    #[test]
    fn bad_port_override_is_an_error() {
        let err = apply_env_overrides_with(HookforgeConfig::default(), &env(&[("HOOKFORGE_PORT", "eighty")]))
            .unwrap_err();
        assert!(err.to_string().contains("HOOKFORGE_PORT"));
    }
}
