//! Config file reading.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the HookForge config directory.
/// Priority: `HOOKFORGE_CONFIG_DIR` env > `<platform config dir>/hookforge` > `./.hookforge`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("HOOKFORGE_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::config_dir() {
        Some(base) => base.join("hookforge"),
        None => PathBuf::from(".hookforge"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Read the config file as an untyped tree, ready for env substitution.
///
/// A missing file yields an empty mapping so a deployment can be configured
/// entirely through the environment.
pub async fn load_raw_config(path: &Path) -> Result<Value> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(Value::Object(serde_json::Map::new()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let value: Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    // An empty file parses as null.
    Ok(if value.is_null() { Value::Object(serde_json::Map::new()) } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_empty_mapping() {
        let path = std::env::temp_dir().join("hookforge-does-not-exist").join("config.yaml");
        let value = load_raw_config(&path).await.unwrap();
        assert_eq!(value, serde_json::json!({}));
    }

    #[tokio::test]
    async fn reads_yaml_into_value_tree() {
        let dir = std::env::temp_dir().join(format!("hookforge-io-{}", std::process::id()));
        fs::create_dir_all(&dir).await.unwrap();
        let path = config_file_path(&dir);
        fs::write(&path, "application_id: \"42\"\nport: 9000\n").await.unwrap();

        let value = load_raw_config(&path).await.unwrap();

        assert_eq!(value["application_id"], "42");
        assert_eq!(value["port"], 9000);
        let _ = fs::remove_dir_all(&dir).await;
    }
}
