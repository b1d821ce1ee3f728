//! HookForge runtime configuration schema.

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Root configuration.
///
/// Every field has a default so a partial file (or none at all, with
/// credentials supplied through `HOOKFORGE_*` variables) still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HookforgeConfig {
    /// Application snowflake the commands are registered under.
    #[serde(default)]
    pub application_id: String,

    /// Hex-encoded Ed25519 key used to verify inbound requests.
    #[serde(default)]
    pub public_key: String,

    /// Bot token for outbound REST calls.
    #[serde(default)]
    pub token: String,

    #[serde(default = "defaults::route")]
    pub route: String,

    #[serde(default = "defaults::bind_address")]
    pub bind_address: String,

    #[serde(default = "defaults::port")]
    pub port: u16,

    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    #[serde(default = "defaults::log_level")]
    pub log_level: String,

    #[serde(default = "defaults::log_dir")]
    pub log_dir: String,

    /// Push queued commands before serving.
    #[serde(default = "defaults::enabled")]
    pub sync_on_startup: bool,

    /// Channel that receives a short notice after each command sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_log_channel_id: Option<String>,

    #[serde(default = "defaults::not_found_message")]
    pub not_found_message: String,

    #[serde(default = "defaults::check_failed_message")]
    pub check_failed_message: String,

    #[serde(default = "defaults::error_message")]
    pub error_message: String,
}

impl Default for HookforgeConfig {
    fn default() -> Self {
        Self {
            application_id: String::new(),
            public_key: String::new(),
            token: String::new(),
            route: defaults::route(),
            bind_address: defaults::bind_address(),
            port: defaults::port(),
            api_base: defaults::api_base(),
            log_level: defaults::log_level(),
            log_dir: defaults::log_dir(),
            sync_on_startup: true,
            sync_log_channel_id: None,
            not_found_message: defaults::not_found_message(),
            check_failed_message: defaults::check_failed_message(),
            error_message: defaults::error_message(),
        }
    }
}

impl HookforgeConfig {
    /// `bind_address:port`, as accepted by `SocketAddr::from_str`.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_fills_defaults() {
        let config: HookforgeConfig = serde_yaml::from_str("application_id: \"42\"\nport: 9000\n").unwrap();
        assert_eq!(config.application_id, "42");
        assert_eq!(config.port, 9000);
        assert_eq!(config.route, "/interactions");
        assert!(config.sync_on_startup);
        assert_eq!(config.not_found_message, "command not implemented!");
        assert_eq!(config.listen_addr(), "0.0.0.0:9000");
    }
}
