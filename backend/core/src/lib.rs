pub mod entities;
pub mod error;
pub mod interaction;
pub mod response;
pub mod types;

pub use entities::{Attachment, Channel, Member, Message, ResolvedData, Role, User};
pub use error::HookError;
pub use interaction::{
    CommandData, CommandDataOption, ComponentData, Interaction, InteractionData, ModalData,
    ModalRow, ModalTextInput,
};
pub use response::{AutocompleteChoice, InteractionResponse, ResponseData};
pub use types::{
    CallbackType, CommandType, ComponentType, InteractionType, OptionType, Snowflake,
};
