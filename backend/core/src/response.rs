//! Interaction callback responses: `{type, data}` bodies returned to the platform.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::CallbackType;

/// Message flag that hides a response from everyone but the invoker.
pub const EPHEMERAL_FLAG: u64 = 1 << 6;

/// Maximum number of autocomplete choices the platform accepts.
pub const MAX_AUTOCOMPLETE_CHOICES: usize = 25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutocompleteChoice {
    pub name: String,
    pub value: Value,
}

impl AutocompleteChoice {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub embeds: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub components: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<AutocompleteChoice>>,
    /// Modal identity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl ResponseData {
    pub fn is_ephemeral(&self) -> bool {
        self.flags.is_some_and(|f| f & EPHEMERAL_FLAG != 0)
    }
}

/// Body returned for an interaction. `data` is omitted for pongs and defers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: CallbackType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self { kind: CallbackType::Pong, data: None }
    }

    pub fn message(content: impl Into<String>) -> Self {
        Self {
            kind: CallbackType::ChannelMessageWithSource,
            data: Some(ResponseData { content: Some(content.into()), ..Default::default() }),
        }
    }

    /// Message visible only to the invoker.
    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            kind: CallbackType::ChannelMessageWithSource,
            data: Some(ResponseData {
                content: Some(content.into()),
                flags: Some(EPHEMERAL_FLAG),
                ..Default::default()
            }),
        }
    }

    /// Acknowledge now, follow up later.
    pub fn defer(ephemeral: bool) -> Self {
        Self {
            kind: CallbackType::DeferredChannelMessageWithSource,
            data: ephemeral.then(|| ResponseData { flags: Some(EPHEMERAL_FLAG), ..Default::default() }),
        }
    }

    /// Acknowledge a component interaction without changing its message.
    pub fn defer_update() -> Self {
        Self { kind: CallbackType::DeferredUpdateMessage, data: None }
    }

    pub fn update_message(data: ResponseData) -> Self {
        Self { kind: CallbackType::UpdateMessage, data: Some(data) }
    }

    /// Autocomplete answer. Choices beyond the platform limit are dropped.
    pub fn autocomplete(mut choices: Vec<AutocompleteChoice>) -> Self {
        choices.truncate(MAX_AUTOCOMPLETE_CHOICES);
        Self {
            kind: CallbackType::ApplicationCommandAutocompleteResult,
            data: Some(ResponseData { choices: Some(choices), ..Default::default() }),
        }
    }

    /// Open a modal. `rows` are action rows holding text inputs.
    pub fn modal(custom_id: impl Into<String>, title: impl Into<String>, rows: Vec<Value>) -> Self {
        Self {
            kind: CallbackType::Modal,
            data: Some(ResponseData {
                custom_id: Some(custom_id.into()),
                title: Some(title.into()),
                components: rows,
                ..Default::default()
            }),
        }
    }

    /// Message carrying a single embed and no text.
    pub fn embed(embed: Value) -> Self {
        Self {
            kind: CallbackType::ChannelMessageWithSource,
            data: Some(ResponseData { embeds: vec![embed], ..Default::default() }),
        }
    }

    pub fn with_embed(mut self, embed: Value) -> Self {
        self.data.get_or_insert_with(ResponseData::default).embeds.push(embed);
        self
    }

    pub fn with_component_row(mut self, row: Value) -> Self {
        self.data.get_or_insert_with(ResponseData::default).components.push(row);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pong_has_no_data() {
        assert_eq!(serde_json::to_value(InteractionResponse::pong()).unwrap(), json!({ "type": 1 }));
    }

    #[test]
    fn ephemeral_message_sets_flag() {
        let resp = InteractionResponse::ephemeral("hidden");
        assert_eq!(
            serde_json::to_value(&resp).unwrap(),
            json!({ "type": 4, "data": { "content": "hidden", "flags": 64 } })
        );
        assert!(resp.data.unwrap().is_ephemeral());
    }

    #[test]
    fn autocomplete_truncates_to_limit() {
        let choices = (0..40).map(|i| AutocompleteChoice::new(format!("c{i}"), i)).collect();
        let resp = InteractionResponse::autocomplete(choices);
        assert_eq!(resp.data.unwrap().choices.unwrap().len(), MAX_AUTOCOMPLETE_CHOICES);
    }
}
