/// Remote registration: wire schema for command descriptors and the
/// registrar seam the registry syncs through.
use anyhow::Result;
use async_trait::async_trait;
use hookforge_core::{CommandType, OptionType, Snowflake};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::types::{CommandDescriptor, OptionSpec};

/// One row of the platform's bulk-registration response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredCommand {
    pub id: Snowflake,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: CommandType,
}

/// Performs the bulk-replace call against the remote platform.
#[async_trait]
pub trait CommandRegistrar: Send + Sync {
    /// Replace the application's command set with `commands` and return the
    /// rows the platform echoed back, in no particular order.
    async fn bulk_overwrite(&self, commands: Vec<Value>) -> Result<Vec<RegisteredCommand>>;
}

/// Serialize a descriptor into the platform's command schema.
pub fn command_to_wire(cmd: &CommandDescriptor) -> Value {
    let mut payload = Map::new();
    payload.insert("name".into(), json!(cmd.name));
    payload.insert("type".into(), json!(u8::from(cmd.kind)));

    if cmd.kind == CommandType::ChatInput {
        if let Some(description) = &cmd.description {
            payload.insert("description".into(), json!(description));
        }
        let mut options: Vec<Value> = cmd.options.iter().map(|opt| option_to_wire(opt, cmd)).collect();
        options.extend(cmd.subcommands.values().map(subcommand_to_wire));
        if !options.is_empty() {
            payload.insert("options".into(), Value::Array(options));
        }
    }
    if !cmd.dm_permission {
        payload.insert("dm_permission".into(), json!(false));
    }
    if let Some(bits) = cmd.default_member_permissions {
        payload.insert("default_member_permissions".into(), json!(bits.to_string()));
    }
    Value::Object(payload)
}

/// Serialize a static command with its remote id attached, so a bulk
/// replace keeps the existing remote command instead of deleting it.
pub fn static_command_to_wire(remote_id: &str, cmd: &CommandDescriptor) -> Value {
    let mut payload = command_to_wire(cmd);
    if let Value::Object(map) = &mut payload {
        map.insert("id".into(), json!(remote_id));
    }
    payload
}

fn subcommand_to_wire(sub: &CommandDescriptor) -> Value {
    let mut payload = Map::new();
    payload.insert("type".into(), json!(u8::from(OptionType::SubCommand)));
    payload.insert("name".into(), json!(sub.name));
    payload.insert("description".into(), json!(sub.description.clone().unwrap_or_default()));
    if !sub.options.is_empty() {
        let options = sub.options.iter().map(|opt| option_to_wire(opt, sub)).collect();
        payload.insert("options".into(), Value::Array(options));
    }
    Value::Object(payload)
}

fn option_to_wire(opt: &OptionSpec, owner: &CommandDescriptor) -> Value {
    let mut payload = Map::new();
    payload.insert("type".into(), json!(u8::from(opt.kind)));
    payload.insert("name".into(), json!(opt.name));
    payload.insert("description".into(), json!(opt.description));
    if opt.required {
        payload.insert("required".into(), json!(true));
    }
    if !opt.choices.is_empty() {
        payload.insert("choices".into(), json!(opt.choices));
    }
    if owner.autocompletes.contains_key(&opt.name) {
        payload.insert("autocomplete".into(), json!(true));
    }
    if let Some(min) = opt.min_value {
        payload.insert("min_value".into(), bound(opt.kind, min));
    }
    if let Some(max) = opt.max_value {
        payload.insert("max_value".into(), bound(opt.kind, max));
    }
    if let Some(min) = opt.min_length {
        payload.insert("min_length".into(), json!(min));
    }
    if let Some(max) = opt.max_length {
        payload.insert("max_length".into(), json!(max));
    }
    if !opt.channel_types.is_empty() {
        payload.insert("channel_types".into(), json!(opt.channel_types));
    }
    Value::Object(payload)
}

/// Integer options take integral bounds on the wire.
fn bound(kind: OptionType, value: f64) -> Value {
    if kind == OptionType::Integer {
        json!(value as i64)
    } else {
        json!(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::autocomplete_fn;

    #[test]
    fn chat_command_serializes_options_and_subcommands() {
        let cmd = CommandDescriptor::slash("config", "Manage settings")
            .option(OptionSpec::integer("limit", "How many").required().min_value(2.0).max_value(100.0))
            .option(OptionSpec::string("query", "Search"))
            .autocomplete("query", autocomplete_fn(|_, _| async { Ok(vec![]) }))
            .subcommand(
                CommandDescriptor::slash("reset", "Reset everything")
                    .option(OptionSpec::boolean("hard", "Wipe state")),
            )
            .dm_permission(false)
            .default_member_permissions(1 << 13);

        let wire = command_to_wire(&cmd);
        assert_eq!(wire["type"], 1);
        assert_eq!(wire["description"], "Manage settings");
        assert_eq!(wire["dm_permission"], false);
        assert_eq!(wire["default_member_permissions"], "8192");

        let options = wire["options"].as_array().unwrap();
        assert_eq!(options[0]["required"], true);
        assert_eq!(options[0]["min_value"], 2);
        assert_eq!(options[1]["autocomplete"], true);
        assert_eq!(options[2]["type"], 1);
        assert_eq!(options[2]["options"][0]["name"], "hard");
    }

    #[test]
    fn static_command_carries_its_remote_id() {
        let wire = static_command_to_wire("555", &CommandDescriptor::message("Quote"));
        assert_eq!(wire, json!({ "id": "555", "name": "Quote", "type": 3 }));
    }

    #[test]
    fn context_menu_omits_description_and_options() {
        let wire = command_to_wire(&CommandDescriptor::user("avatar"));
        assert_eq!(wire, json!({ "name": "avatar", "type": 2 }));
    }
}
