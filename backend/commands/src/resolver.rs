/// Argument resolution.
///
/// Turns raw option trees, select values, and modal fields into the
/// positional argument list a handler expects. Reference options are looked
/// up in the interaction's resolved side-table; a reference that is not
/// there is an error, never a placeholder.
use std::collections::HashMap;

use hookforge_core::{
    CommandData, CommandDataOption, CommandType, ComponentData, ComponentType, ModalData,
    OptionType, ResolvedData,
};
use serde_json::Value;
use thiserror::Error;

use crate::components::ModalField;
use crate::types::{Argument, OptionSpec};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionFailure {
    #[error("option was not supplied")]
    Missing,

    #[error("expected {expected}, got {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("{kind} {id} is not in the resolved data")]
    Unresolved { kind: &'static str, id: String },
}

/// Failure to build an argument, naming the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot resolve `{field}`: {reason}")]
pub struct ResolutionError {
    pub field: String,
    pub reason: ResolutionFailure,
}

impl ResolutionError {
    fn new(field: impl Into<String>, reason: ResolutionFailure) -> Self {
        Self { field: field.into(), reason }
    }

    fn mismatch(field: &str, expected: impl ToString, found: &Value) -> Self {
        Self::new(
            field,
            ResolutionFailure::TypeMismatch { expected: expected.to_string(), found: json_kind(found).into() },
        )
    }

    fn unresolved(field: &str, kind: &'static str, id: &str) -> Self {
        Self::new(field, ResolutionFailure::Unresolved { kind, id: id.to_string() })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolves arguments against one interaction's side-table.
///
/// `in_guild` selects member snapshots over bare users where both exist.
pub struct ParameterResolver<'a> {
    resolved: &'a ResolvedData,
    in_guild: bool,
}

impl<'a> ParameterResolver<'a> {
    pub fn new(resolved: &'a ResolvedData, in_guild: bool) -> Self {
        Self { resolved, in_guild }
    }

    /// Bind wire options to `schema`, in schema order. The result always has
    /// exactly `schema.len()` entries.
    pub fn resolve_options(
        &self,
        schema: &[OptionSpec],
        options: &[CommandDataOption],
    ) -> Result<Vec<Argument>, ResolutionError> {
        schema
            .iter()
            .map(|spec| match options.iter().find(|opt| opt.name == spec.name) {
                Some(opt) => self.resolve_option(spec, opt),
                None if spec.required => Err(ResolutionError::new(&spec.name, ResolutionFailure::Missing)),
                None => Ok(spec.default.clone()),
            })
            .collect()
    }

    fn resolve_option(&self, spec: &OptionSpec, opt: &CommandDataOption) -> Result<Argument, ResolutionError> {
        let field = spec.name.as_str();
        let value = opt
            .value
            .as_ref()
            .ok_or_else(|| ResolutionError::new(field, ResolutionFailure::Missing))?;

        if opt.kind != spec.kind {
            return Err(ResolutionError::new(
                field,
                ResolutionFailure::TypeMismatch { expected: spec.kind.to_string(), found: opt.kind.to_string() },
            ));
        }

        match spec.kind {
            OptionType::String => value
                .as_str()
                .map(|s| Argument::String(s.to_string()))
                .ok_or_else(|| ResolutionError::mismatch(field, spec.kind, value)),
            OptionType::Integer => value
                .as_i64()
                .map(Argument::Integer)
                .ok_or_else(|| ResolutionError::mismatch(field, spec.kind, value)),
            OptionType::Number => value
                .as_f64()
                .map(Argument::Number)
                .ok_or_else(|| ResolutionError::mismatch(field, spec.kind, value)),
            OptionType::Boolean => value
                .as_bool()
                .map(Argument::Boolean)
                .ok_or_else(|| ResolutionError::mismatch(field, spec.kind, value)),
            kind if kind.is_reference() => {
                let id = value
                    .as_str()
                    .ok_or_else(|| ResolutionError::mismatch(field, "snowflake", value))?;
                self.resolve_reference(field, kind, id)
            }
            other => Err(ResolutionError::mismatch(field, format!("value option, not {other}"), value)),
        }
    }

    fn resolve_reference(&self, field: &str, kind: OptionType, id: &str) -> Result<Argument, ResolutionError> {
        match kind {
            OptionType::User => self.user(id).ok_or_else(|| ResolutionError::unresolved(field, "user", id)),
            OptionType::Role => self
                .resolved
                .roles
                .get(id)
                .cloned()
                .map(Argument::Role)
                .ok_or_else(|| ResolutionError::unresolved(field, "role", id)),
            OptionType::Channel => self
                .resolved
                .channels
                .get(id)
                .cloned()
                .map(Argument::Channel)
                .ok_or_else(|| ResolutionError::unresolved(field, "channel", id)),
            OptionType::Attachment => self
                .resolved
                .attachments
                .get(id)
                .cloned()
                .map(Argument::Attachment)
                .ok_or_else(|| ResolutionError::unresolved(field, "attachment", id)),
            OptionType::Mentionable => self
                .user(id)
                .or_else(|| self.resolved.roles.get(id).cloned().map(Argument::Role))
                .ok_or_else(|| ResolutionError::unresolved(field, "mentionable", id)),
            other => Err(ResolutionError::new(
                field,
                ResolutionFailure::TypeMismatch { expected: "reference option".into(), found: other.to_string() },
            )),
        }
    }

    /// Member (with user attached) inside a guild when available, user otherwise.
    fn user(&self, id: &str) -> Option<Argument> {
        let user = self.resolved.users.get(id)?;
        if self.in_guild {
            if let Some(member) = self.resolved.member_with_user(id) {
                return Some(Argument::Member(member));
            }
        }
        Some(Argument::User(user.clone()))
    }

    /// The single target of a user or message context-menu command.
    pub fn resolve_target(&self, data: &CommandData) -> Result<Argument, ResolutionError> {
        let id = data
            .target_id
            .as_deref()
            .ok_or_else(|| ResolutionError::new("target_id", ResolutionFailure::Missing))?;
        match data.kind {
            CommandType::User => self.user(id).ok_or_else(|| ResolutionError::unresolved("target", "user", id)),
            CommandType::Message => self
                .resolved
                .messages
                .get(id)
                .cloned()
                .map(Argument::Message)
                .ok_or_else(|| ResolutionError::unresolved("target", "message", id)),
            CommandType::ChatInput => Err(ResolutionError::new(
                "target",
                ResolutionFailure::TypeMismatch { expected: "context menu command".into(), found: "chat command".into() },
            )),
        }
    }

    /// Values of a select menu. Typed selects resolve each value; string
    /// selects pass through.
    pub fn resolve_select(&self, data: &ComponentData) -> Result<Vec<Argument>, ResolutionError> {
        let field = data.custom_id.as_str();
        match data.component_type {
            ComponentType::StringSelect => {
                Ok(data.values.iter().map(|v| Argument::String(v.clone())).collect())
            }
            ComponentType::UserSelect => data
                .values
                .iter()
                .map(|id| self.user(id).ok_or_else(|| ResolutionError::unresolved(field, "user", id)))
                .collect(),
            ComponentType::RoleSelect => data
                .values
                .iter()
                .map(|id| {
                    self.resolved
                        .roles
                        .get(id)
                        .cloned()
                        .map(Argument::Role)
                        .ok_or_else(|| ResolutionError::unresolved(field, "role", id))
                })
                .collect(),
            ComponentType::ChannelSelect => data
                .values
                .iter()
                .map(|id| {
                    self.resolved
                        .channels
                        .get(id)
                        .cloned()
                        .map(Argument::Channel)
                        .ok_or_else(|| ResolutionError::unresolved(field, "channel", id))
                })
                .collect(),
            ComponentType::MentionableSelect => {
                // Users first, then roles.
                let mut users = Vec::new();
                let mut roles = Vec::new();
                for id in &data.values {
                    if let Some(user) = self.user(id) {
                        users.push(user);
                    } else if let Some(role) = self.resolved.roles.get(id) {
                        roles.push(Argument::Role(role.clone()));
                    } else {
                        return Err(ResolutionError::unresolved(field, "mentionable", id));
                    }
                }
                users.extend(roles);
                Ok(users)
            }
            other => Err(ResolutionError::new(
                field,
                ResolutionFailure::TypeMismatch { expected: "select menu".into(), found: other.to_string() },
            )),
        }
    }
}

/// Flatten a modal's rows into `custom_id → value`, then project onto the
/// declared field order with the same default rule as command options.
pub fn resolve_modal(fields: &[ModalField], data: &ModalData) -> Result<Vec<Argument>, ResolutionError> {
    let submitted: HashMap<&str, &str> = data
        .components
        .iter()
        .flat_map(|row| row.components.iter())
        .filter(|input| input.kind == ComponentType::TextInput)
        .filter_map(|input| input.value.as_deref().map(|v| (input.custom_id.as_str(), v)))
        .collect();

    fields
        .iter()
        .map(|field| match submitted.get(field.custom_id.as_str()) {
            Some(value) => Ok(Argument::String((*value).to_string())),
            None if field.required => Err(ResolutionError::new(&field.custom_id, ResolutionFailure::Missing)),
            None => Ok(field.default.clone()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn resolved(value: Value) -> ResolvedData {
        serde_json::from_value(value).unwrap()
    }

    fn options(value: Value) -> Vec<CommandDataOption> {
        serde_json::from_value(value).unwrap()
    }

    fn user_count_schema() -> Vec<OptionSpec> {
        vec![
            OptionSpec::user("user", "who").required(),
            OptionSpec::integer("count", "how many").default_value(1i64),
        ]
    }

    #[test]
    fn binds_reference_and_fills_default() {
        let data = resolved(json!({ "users": { "123": { "id": "123", "username": "u" } } }));
        let opts = options(json!([{ "name": "user", "type": 6, "value": "123" }]));

        let args = ParameterResolver::new(&data, false)
            .resolve_options(&user_count_schema(), &opts)
            .unwrap();

        assert_eq!(args.len(), 2);
        assert_eq!(args[0], Argument::User(data.users["123"].clone()));
        assert_eq!(args[1], Argument::Integer(1));
    }

    #[test]
    fn missing_reference_names_the_field() {
        let data = resolved(json!({ "users": {} }));
        let opts = options(json!([{ "name": "user", "type": 6, "value": "999" }]));

        let err = ParameterResolver::new(&data, false)
            .resolve_options(&user_count_schema(), &opts)
            .unwrap_err();

        assert_eq!(err.field, "user");
        assert_eq!(err.reason, ResolutionFailure::Unresolved { kind: "user", id: "999".into() });
    }

    #[test]
    fn schema_order_wins_over_wire_order() {
        let schema = vec![
            OptionSpec::string("first", "a").required(),
            OptionSpec::boolean("second", "b").required(),
            OptionSpec::number("third", "c"),
        ];
        let opts = options(json!([
            { "name": "second", "type": 5, "value": true },
            { "name": "first", "type": 3, "value": "x" }
        ]));

        let args = ParameterResolver::new(&ResolvedData::default(), false)
            .resolve_options(&schema, &opts)
            .unwrap();

        assert_eq!(args, vec![Argument::from("x"), Argument::Boolean(true), Argument::Absent]);
    }

    #[test]
    fn primitive_type_mismatch_fails() {
        let schema = vec![OptionSpec::integer("limit", "n").required()];
        let opts = options(json!([{ "name": "limit", "type": 4, "value": "ten" }]));

        let err = ParameterResolver::new(&ResolvedData::default(), false)
            .resolve_options(&schema, &opts)
            .unwrap_err();

        assert_eq!(err.field, "limit");
        assert!(matches!(err.reason, ResolutionFailure::TypeMismatch { .. }));
    }

    #[test]
    fn guild_user_option_resolves_member() {
        let data = resolved(json!({
            "users": { "5": { "id": "5", "username": "ferris" } },
            "members": { "5": { "nick": "crab", "roles": [] } }
        }));
        let schema = vec![OptionSpec::user("target", "t").required()];
        let opts = options(json!([{ "name": "target", "type": 6, "value": "5" }]));

        let args = ParameterResolver::new(&data, true).resolve_options(&schema, &opts).unwrap();
        let member = args[0].as_member().unwrap();
        assert_eq!(member.nick.as_deref(), Some("crab"));
        assert_eq!(args[0].as_user().unwrap().username, "ferris");
    }

    #[test]
    fn mentionable_falls_back_to_role() {
        let data = resolved(json!({ "roles": { "8": { "id": "8", "name": "mods" } } }));
        let schema = vec![OptionSpec::mentionable("who", "w").required()];
        let opts = options(json!([{ "name": "who", "type": 9, "value": "8" }]));

        let args = ParameterResolver::new(&data, false).resolve_options(&schema, &opts).unwrap();
        assert_eq!(args[0].as_role().unwrap().name, "mods");
    }

    #[test]
    fn context_menu_resolves_message_target() {
        let data: CommandData = serde_json::from_value(json!({
            "id": "1", "name": "quote", "type": 3, "target_id": "42",
            "resolved": { "messages": { "42": { "id": "42", "channel_id": "7", "content": "hi" } } }
        }))
        .unwrap();

        let target = ParameterResolver::new(&data.resolved, false).resolve_target(&data).unwrap();
        assert_eq!(target.as_message().unwrap().content, "hi");
    }

    #[test]
    fn select_values_cross_resolve() {
        let data: ComponentData = serde_json::from_value(json!({
            "custom_id": "pick", "component_type": 6, "values": ["1", "2"],
            "resolved": { "roles": {
                "1": { "id": "1", "name": "a" },
                "2": { "id": "2", "name": "b" }
            } }
        }))
        .unwrap();

        let values = ParameterResolver::new(&data.resolved, true).resolve_select(&data).unwrap();
        let names: Vec<_> = values.iter().map(|v| v.as_role().unwrap().name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn string_select_passes_through() {
        let data: ComponentData = serde_json::from_value(json!({
            "custom_id": "flavor", "component_type": 3, "values": ["mint"]
        }))
        .unwrap();
        let values = ParameterResolver::new(&data.resolved, false).resolve_select(&data).unwrap();
        assert_eq!(values, vec![Argument::from("mint")]);
    }

    #[test]
    fn mentionable_select_orders_users_before_roles() {
        let data: ComponentData = serde_json::from_value(json!({
            "custom_id": "m", "component_type": 7, "values": ["r1", "u1"],
            "resolved": {
                "users": { "u1": { "id": "u1", "username": "x" } },
                "roles": { "r1": { "id": "r1", "name": "y" } }
            }
        }))
        .unwrap();
        let values = ParameterResolver::new(&data.resolved, false).resolve_select(&data).unwrap();
        assert!(values[0].as_user().is_some());
        assert!(values[1].as_role().is_some());
    }

    fn reference_table() -> Value {
        json!({
            "users": { "u1": { "id": "u1", "username": "ferris" } },
            "channels": { "c1": { "id": "c1", "type": 0, "name": "general" } },
            "attachments": { "a1": { "id": "a1", "filename": "log.txt", "url": "https://cdn/log.txt" } }
        })
    }

    fn label(arg: &Argument) -> String {
        match arg {
            Argument::User(u) => format!("user:{}", u.username),
            Argument::Channel(c) => format!("channel:{}", c.name.as_deref().unwrap_or_default()),
            Argument::Attachment(a) => format!("attachment:{}", a.filename),
            other => format!("{other:?}"),
        }
    }

    #[test]
    fn channel_and_attachment_options_resolve_or_name_the_gap() {
        let data = resolved(reference_table());
        let cases = [
            (OptionSpec::channel("where", "w"), 7, "c1", Ok("channel:general")),
            (OptionSpec::channel("where", "w"), 7, "c9", Err("channel")),
            (OptionSpec::attachment("file", "f"), 11, "a1", Ok("attachment:log.txt")),
            (OptionSpec::attachment("file", "f"), 11, "a9", Err("attachment")),
        ];

        for (spec, wire_type, id, expected) in cases {
            let name = spec.name.clone();
            let opts = options(json!([{ "name": name, "type": wire_type, "value": id }]));
            let result = ParameterResolver::new(&data, false).resolve_options(&[spec.required()], &opts);
            match expected {
                Ok(want) => assert_eq!(label(&result.unwrap()[0]), want, "{name} -> {id}"),
                Err(kind) => {
                    let err = result.unwrap_err();
                    assert_eq!(err.field, name);
                    assert_eq!(err.reason, ResolutionFailure::Unresolved { kind, id: id.into() });
                }
            }
        }
    }

    #[test]
    fn user_and_channel_selects_resolve_or_name_the_gap() {
        let cases = [
            (5, "u1", Ok("user:ferris")),
            (5, "u9", Err("user")),
            (8, "c1", Ok("channel:general")),
            (8, "c9", Err("channel")),
        ];

        for (component_type, id, expected) in cases {
            let data: ComponentData = serde_json::from_value(json!({
                "custom_id": "pick", "component_type": component_type, "values": [id],
                "resolved": reference_table()
            }))
            .unwrap();
            let result = ParameterResolver::new(&data.resolved, false).resolve_select(&data);
            match expected {
                Ok(want) => {
                    let values = result.unwrap();
                    assert_eq!(values.len(), 1);
                    assert_eq!(label(&values[0]), want, "select {component_type} -> {id}");
                }
                Err(kind) => {
                    let err = result.unwrap_err();
                    assert_eq!(err.field, "pick");
                    assert_eq!(err.reason, ResolutionFailure::Unresolved { kind, id: id.into() });
                }
            }
        }
    }

    #[test]
    fn modal_fields_follow_declared_order() {
        let data: ModalData = serde_json::from_value(json!({
            "custom_id": "feedback",
            "components": [
                { "type": 1, "components": [{ "type": 4, "custom_id": "body", "value": "great" }] },
                { "type": 1, "components": [{ "type": 4, "custom_id": "title", "value": "hello" }] }
            ]
        }))
        .unwrap();
        let fields = vec![
            ModalField::new("title"),
            ModalField::new("body"),
            ModalField::new("contact").default_value("none"),
        ];

        let args = resolve_modal(&fields, &data).unwrap();
        assert_eq!(args, vec![Argument::from("hello"), Argument::from("great"), Argument::from("none")]);
    }
}
