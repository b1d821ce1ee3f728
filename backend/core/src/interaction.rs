//! Inbound interaction payload.
//!
//! The platform sends one envelope shape for every interaction kind, with a
//! `data` object whose layout depends on `type`. `Interaction` is decoded in
//! two steps: the loose envelope first, then `data` into the variant the
//! discriminator names.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::{Member, ResolvedData, User};
use crate::error::HookError;
use crate::types::{CommandType, ComponentType, InteractionType, OptionType, Snowflake};

// ---------------------------------------------------------------------------
// Payload variants
// ---------------------------------------------------------------------------

/// `data` of an application command or autocomplete interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandData {
    pub id: Snowflake,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: CommandType,
    #[serde(default)]
    pub options: Vec<CommandDataOption>,
    #[serde(default)]
    pub resolved: ResolvedData,
    /// Target of a user/message context-menu command.
    #[serde(default)]
    pub target_id: Option<Snowflake>,
    #[serde(default)]
    pub guild_id: Option<Snowflake>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDataOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: OptionType,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub options: Vec<CommandDataOption>,
    #[serde(default)]
    pub focused: bool,
}

impl CommandData {
    /// The invoked subcommand, when the first option is one.
    pub fn subcommand(&self) -> Option<&CommandDataOption> {
        self.options.first().filter(|opt| opt.kind == OptionType::SubCommand)
    }

    /// Options of the invoked leaf: the subcommand's options if a subcommand
    /// was invoked, the top-level options otherwise.
    pub fn leaf_options(&self) -> &[CommandDataOption] {
        match self.subcommand() {
            Some(sub) => &sub.options,
            None => &self.options,
        }
    }

    /// The option the user is currently typing into.
    pub fn focused_option(&self) -> Option<&CommandDataOption> {
        let leaf = self.leaf_options();
        leaf.iter().find(|opt| opt.focused).or_else(|| leaf.first())
    }
}

/// `data` of a button or select interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentData {
    pub custom_id: String,
    pub component_type: ComponentType,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub resolved: ResolvedData,
}

/// `data` of a modal submission: rows of text inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalData {
    pub custom_id: String,
    #[serde(default)]
    pub components: Vec<ModalRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalRow {
    #[serde(default)]
    pub components: Vec<ModalTextInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModalTextInput {
    #[serde(rename = "type")]
    pub kind: ComponentType,
    pub custom_id: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionData {
    Ping,
    ApplicationCommand(CommandData),
    Autocomplete(CommandData),
    Component(ComponentData),
    ModalSubmit(ModalData),
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct RawInteraction {
    id: Snowflake,
    application_id: Snowflake,
    #[serde(rename = "type")]
    kind: InteractionType,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    guild_id: Option<Snowflake>,
    #[serde(default)]
    channel_id: Option<Snowflake>,
    #[serde(default)]
    member: Option<Member>,
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    token: String,
    #[serde(default)]
    locale: Option<String>,
    #[serde(default)]
    message: Option<Value>,
}

/// One inbound signed event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawInteraction")]
pub struct Interaction {
    /// Request identity, used for response correlation only.
    pub id: Snowflake,
    pub application_id: Snowflake,
    pub kind: InteractionType,
    pub data: InteractionData,
    pub guild_id: Option<Snowflake>,
    pub channel_id: Option<Snowflake>,
    pub member: Option<Member>,
    pub user: Option<User>,
    pub token: String,
    pub locale: Option<String>,
    /// Message the component was attached to, left untyped.
    pub message: Option<Value>,
}

impl TryFrom<RawInteraction> for Interaction {
    type Error = HookError;

    fn try_from(raw: RawInteraction) -> Result<Self, Self::Error> {
        let data = match raw.kind {
            InteractionType::Ping => InteractionData::Ping,
            InteractionType::ApplicationCommand => {
                InteractionData::ApplicationCommand(decode_data(raw.data, "application command")?)
            }
            InteractionType::Autocomplete => {
                InteractionData::Autocomplete(decode_data(raw.data, "autocomplete")?)
            }
            InteractionType::MessageComponent => {
                InteractionData::Component(decode_data(raw.data, "component")?)
            }
            InteractionType::ModalSubmit => {
                InteractionData::ModalSubmit(decode_data(raw.data, "modal submit")?)
            }
        };

        Ok(Self {
            id: raw.id,
            application_id: raw.application_id,
            kind: raw.kind,
            data,
            guild_id: raw.guild_id,
            channel_id: raw.channel_id,
            member: raw.member,
            user: raw.user,
            token: raw.token,
            locale: raw.locale,
            message: raw.message,
        })
    }
}

fn decode_data<T: serde::de::DeserializeOwned>(
    data: Option<Value>,
    kind: &'static str,
) -> Result<T, HookError> {
    let data = data.ok_or(HookError::MissingData(kind))?;
    serde_json::from_value(data).map_err(|e| HookError::MalformedPayload(format!("{kind}: {e}")))
}

impl Interaction {
    /// Parse an interaction from a raw (already verified) request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, HookError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// The invoking user: the member's user inside a guild, `user` in DMs.
    pub fn author(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
    }

    pub fn in_guild(&self) -> bool {
        self.guild_id.is_some()
    }

    pub fn custom_id(&self) -> Option<&str> {
        match &self.data {
            InteractionData::Component(c) => Some(&c.custom_id),
            InteractionData::ModalSubmit(m) => Some(&m.custom_id),
            _ => None,
        }
    }

    pub fn command(&self) -> Option<&CommandData> {
        match &self.data {
            InteractionData::ApplicationCommand(c) | InteractionData::Autocomplete(c) => Some(c),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ping_needs_no_data() {
        let i: Interaction = serde_json::from_value(json!({
            "id": "1", "application_id": "2", "type": 1, "token": "t"
        }))
        .unwrap();
        assert_eq!(i.data, InteractionData::Ping);
        assert!(i.author().is_none());
    }

    #[test]
    fn command_data_exposes_subcommand_leaf() {
        let i: Interaction = serde_json::from_value(json!({
            "id": "1", "application_id": "2", "type": 2, "token": "t",
            "guild_id": "77",
            "member": { "user": { "id": "5", "username": "ferris" }, "roles": [] },
            "data": {
                "id": "10", "name": "config", "type": 1,
                "options": [{
                    "name": "set", "type": 1,
                    "options": [{ "name": "key", "type": 3, "value": "mode" }]
                }]
            }
        }))
        .unwrap();

        let data = i.command().unwrap();
        assert_eq!(data.subcommand().map(|s| s.name.as_str()), Some("set"));
        assert_eq!(data.leaf_options()[0].name, "key");
        assert_eq!(i.author().map(|u| u.id.as_str()), Some("5"));
        assert!(i.in_guild());
    }

    #[test]
    fn focused_option_prefers_flag() {
        let data: CommandData = serde_json::from_value(json!({
            "id": "10", "name": "search", "type": 1,
            "options": [
                { "name": "scope", "type": 3, "value": "all" },
                { "name": "query", "type": 3, "value": "ru", "focused": true }
            ]
        }))
        .unwrap();
        assert_eq!(data.focused_option().unwrap().name, "query");
    }

    #[test]
    fn component_without_data_is_rejected() {
        let err = serde_json::from_value::<Interaction>(json!({
            "id": "1", "application_id": "2", "type": 3, "token": "t"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("no data"));
    }
}
