use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::HookError;

/// Opaque remote entity identifier. Kept as the string the platform sends.
pub type Snowflake = String;

/// Declares a fieldless enum that travels on the wire as a small integer.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "u8", into = "u8")]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $value ),+
        }

        impl TryFrom<u8> for $name {
            type Error = HookError;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $( $value => Ok(Self::$variant), )+
                    other => Err(HookError::UnknownDiscriminator { kind: $label, value: other }),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value as u8
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        }
    };
}

wire_enum! {
    /// Top-level interaction discriminator.
    InteractionType, "interaction" {
        Ping = 1,
        ApplicationCommand = 2,
        MessageComponent = 3,
        Autocomplete = 4,
        ModalSubmit = 5,
    }
}

wire_enum! {
    /// Command category. Part of the registry lookup key.
    CommandType, "command" {
        /// Typed `/slash` command.
        ChatInput = 1,
        /// Right-click on a user.
        User = 2,
        /// Right-click on a message.
        Message = 3,
    }
}

wire_enum! {
    /// Semantic type of a command option.
    OptionType, "option" {
        SubCommand = 1,
        SubCommandGroup = 2,
        String = 3,
        Integer = 4,
        Boolean = 5,
        User = 6,
        Channel = 7,
        Role = 8,
        Mentionable = 9,
        Number = 10,
        Attachment = 11,
    }
}

wire_enum! {
    ComponentType, "component" {
        ActionRow = 1,
        Button = 2,
        StringSelect = 3,
        TextInput = 4,
        UserSelect = 5,
        RoleSelect = 6,
        MentionableSelect = 7,
        ChannelSelect = 8,
    }
}

wire_enum! {
    /// Response callback discriminator.
    CallbackType, "callback" {
        Pong = 1,
        ChannelMessageWithSource = 4,
        DeferredChannelMessageWithSource = 5,
        DeferredUpdateMessage = 6,
        UpdateMessage = 7,
        ApplicationCommandAutocompleteResult = 8,
        Modal = 9,
    }
}

impl Default for CommandType {
    fn default() -> Self {
        Self::ChatInput
    }
}

impl OptionType {
    /// Options whose raw value is a snowflake into the resolved side-table.
    pub fn is_reference(self) -> bool {
        matches!(
            self,
            Self::User | Self::Channel | Self::Role | Self::Mentionable | Self::Attachment
        )
    }
}

impl ComponentType {
    pub fn is_select(self) -> bool {
        matches!(
            self,
            Self::StringSelect
                | Self::UserSelect
                | Self::RoleSelect
                | Self::MentionableSelect
                | Self::ChannelSelect
        )
    }
}
