/// Command descriptors, option schemas, and resolved argument values.
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use hookforge_core::{
    Attachment, AutocompleteChoice, Channel, CommandType, Member, Message, OptionType, Role,
    Snowflake, User,
};

use crate::handler::{AutocompleteHandler, Check, InteractionHandler};

// ---------------------------------------------------------------------------
// Argument
// ---------------------------------------------------------------------------

/// One resolved, call-ready argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    /// An omitted optional option with no declared default.
    Absent,
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    User(User),
    Member(Member),
    Role(Role),
    Channel(Channel),
    Attachment(Attachment),
    Message(Message),
    /// Select values, in submission order.
    List(Vec<Argument>),
}

impl Argument {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numbers, and integers widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// The user behind a `User` or a `Member` argument.
    pub fn as_user(&self) -> Option<&User> {
        match self {
            Self::User(u) => Some(u),
            Self::Member(m) => m.user.as_ref(),
            _ => None,
        }
    }

    pub fn as_member(&self) -> Option<&Member> {
        match self {
            Self::Member(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_role(&self) -> Option<&Role> {
        match self {
            Self::Role(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_channel(&self) -> Option<&Channel> {
        match self {
            Self::Channel(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_attachment(&self) -> Option<&Attachment> {
        match self {
            Self::Attachment(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Self::Message(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Argument]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Argument {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Argument {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for Argument {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

// ---------------------------------------------------------------------------
// Option schema
// ---------------------------------------------------------------------------

/// One declared option of a command. Declaration order is the order
/// arguments are bound in, regardless of wire order.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionSpec {
    pub name: String,
    pub description: String,
    pub kind: OptionType,
    pub required: bool,
    /// Bound when the option is omitted.
    pub default: Argument,
    pub choices: Vec<AutocompleteChoice>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
    pub min_length: Option<u16>,
    pub max_length: Option<u16>,
    pub channel_types: Vec<u8>,
}

impl OptionSpec {
    pub fn new(name: impl Into<String>, description: impl Into<String>, kind: OptionType) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required: false,
            default: Argument::Absent,
            choices: Vec::new(),
            min_value: None,
            max_value: None,
            min_length: None,
            max_length: None,
            channel_types: Vec::new(),
        }
    }

    pub fn string(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionType::String)
    }

    pub fn integer(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionType::Integer)
    }

    pub fn number(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionType::Number)
    }

    pub fn boolean(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionType::Boolean)
    }

    pub fn user(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionType::User)
    }

    pub fn channel(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionType::Channel)
    }

    pub fn role(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionType::Role)
    }

    pub fn mentionable(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionType::Mentionable)
    }

    pub fn attachment(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, OptionType::Attachment)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, default: impl Into<Argument>) -> Self {
        self.default = default.into();
        self
    }

    pub fn choice(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.choices.push(AutocompleteChoice::new(name, value));
        self
    }

    pub fn min_value(mut self, min: f64) -> Self {
        self.min_value = Some(min);
        self
    }

    pub fn max_value(mut self, max: f64) -> Self {
        self.max_value = Some(max);
        self
    }

    pub fn min_length(mut self, min: u16) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: u16) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn channel_types(mut self, types: &[u8]) -> Self {
        self.channel_types = types.to_vec();
        self
    }
}

// ---------------------------------------------------------------------------
// Command descriptor
// ---------------------------------------------------------------------------

/// Registry lookup key. Same-named commands in different categories are
/// distinct commands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandKey {
    pub name: String,
    pub kind: CommandType,
}

impl CommandKey {
    pub fn new(name: impl Into<String>, kind: CommandType) -> Self {
        Self { name: name.into(), kind }
    }
}

impl fmt::Display for CommandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, u8::from(self.kind))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    Unsynced,
    Queued,
    Synced(Snowflake),
}

impl SyncState {
    pub fn remote_id(&self) -> Option<&str> {
        match self {
            Self::Synced(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct CommandDescriptor {
    pub name: String,
    /// Chat commands only.
    pub description: Option<String>,
    pub kind: CommandType,
    pub options: Vec<OptionSpec>,
    /// One level of nesting. Subcommand descriptors never carry subcommands.
    pub subcommands: BTreeMap<String, CommandDescriptor>,
    pub checks: Vec<Arc<dyn Check>>,
    pub autocompletes: HashMap<String, Arc<dyn AutocompleteHandler>>,
    pub handler: Option<Arc<dyn InteractionHandler>>,
    pub dm_permission: bool,
    /// Permission bitset required by default.
    pub default_member_permissions: Option<u64>,
    pub sync_state: SyncState,
}

impl CommandDescriptor {
    fn new(name: impl Into<String>, kind: CommandType) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind,
            options: Vec::new(),
            subcommands: BTreeMap::new(),
            checks: Vec::new(),
            autocompletes: HashMap::new(),
            handler: None,
            dm_permission: true,
            default_member_permissions: None,
            sync_state: SyncState::Unsynced,
        }
    }

    /// A chat (`/slash`) command. Also used to build subcommands.
    pub fn slash(name: impl Into<String>, description: impl Into<String>) -> Self {
        let mut cmd = Self::new(name, CommandType::ChatInput);
        cmd.description = Some(description.into());
        cmd
    }

    /// A context-menu command on a user.
    pub fn user(name: impl Into<String>) -> Self {
        Self::new(name, CommandType::User)
    }

    /// A context-menu command on a message.
    pub fn message(name: impl Into<String>) -> Self {
        Self::new(name, CommandType::Message)
    }

    pub fn key(&self) -> CommandKey {
        CommandKey::new(self.name.clone(), self.kind)
    }

    pub fn option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    /// Nest a subcommand. Any subcommands of `sub` itself are dropped.
    pub fn subcommand(mut self, mut sub: CommandDescriptor) -> Self {
        sub.subcommands.clear();
        self.subcommands.insert(sub.name.clone(), sub);
        self
    }

    pub fn check(mut self, check: Arc<dyn Check>) -> Self {
        self.checks.push(check);
        self
    }

    pub fn autocomplete(mut self, option: impl Into<String>, handler: Arc<dyn AutocompleteHandler>) -> Self {
        self.autocompletes.insert(option.into(), handler);
        self
    }

    pub fn handler(mut self, handler: Arc<dyn InteractionHandler>) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn dm_permission(mut self, allowed: bool) -> Self {
        self.dm_permission = allowed;
        self
    }

    pub fn default_member_permissions(mut self, bits: u64) -> Self {
        self.default_member_permissions = Some(bits);
        self
    }

    pub fn remote_id(&self) -> Option<&str> {
        self.sync_state.remote_id()
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("options", &self.options)
            .field("subcommands", &self.subcommands.keys().collect::<Vec<_>>())
            .field("checks", &self.checks.len())
            .field("autocompletes", &self.autocompletes.keys().collect::<Vec<_>>())
            .field("has_handler", &self.handler.is_some())
            .field("sync_state", &self.sync_state)
            .finish_non_exhaustive()
    }
}
