//! Demo command set registered by `hookforge serve` and `hookforge sync`.

use hookforge_commands::{
    autocomplete_fn, check_fn, handler_fn, Argument, CommandDescriptor, ComponentDescriptor,
    ModalField, OptionSpec,
};
use hookforge_core::{
    AutocompleteChoice, Interaction, InteractionResponse, ResponseData, User,
};
use hookforge_gateway::AppContext;
use serde_json::{json, Value};
use uuid::Uuid;

const REGENERATE_BUTTON: &str = "color:regenerate";
const FEEDBACK_MODAL: &str = "feedback:form";

/// MANAGE_MESSAGES permission bit.
const MANAGE_MESSAGES: u64 = 1 << 13;

const TAGS: &[(&str, &str)] = &[
    ("rules", "Be kind. No spam. Keep it on topic."),
    ("docs", "Documentation lives in the repository wiki."),
    ("release", "Releases ship on the first Monday of each month."),
    ("support", "Open a thread in #help and someone will get to you."),
];

/// Register every demo command and component.
pub fn register(ctx: &mut AppContext) {
    ctx.command(color_command());
    ctx.component(ComponentDescriptor::button(
        REGENERATE_BUTTON,
        handler_fn(|i, _| async move {
            Ok(InteractionResponse::update_message(ResponseData {
                embeds: vec![color_card(i.author())],
                components: vec![regenerate_row()],
                ..Default::default()
            }))
        }),
    ));

    ctx.command(purge_command());
    ctx.command(avatar_command());
    ctx.command(word_count_command());
    ctx.command(tag_command());

    ctx.command(
        CommandDescriptor::slash("feedback", "Send feedback to the maintainers.").handler(handler_fn(
            |_, _| async move {
                Ok(InteractionResponse::modal(
                    FEEDBACK_MODAL,
                    "Feedback",
                    vec![text_input_row("title", "Title", 1), text_input_row("body", "Details", 2)],
                ))
            },
        )),
    );
    ctx.component(ComponentDescriptor::modal(
        FEEDBACK_MODAL,
        vec![ModalField::new("title").required(), ModalField::new("body").default_value("")],
        handler_fn(|_, args| async move {
            let title = args.first().and_then(Argument::as_str).unwrap_or_default().to_string();
            tracing::info!(title = %title, "[Demo] feedback received");
            Ok(InteractionResponse::ephemeral(format!("Thanks! Received \"{title}\".")))
        }),
    ));
}

// ---------------------------------------------------------------------------
// color
// ---------------------------------------------------------------------------

fn random_hex_color() -> String {
    let bytes = Uuid::new_v4();
    let [r, g, b, ..] = *bytes.as_bytes();
    format!("{r:02x}{g:02x}{b:02x}")
}

fn color_card(author: Option<&User>) -> Value {
    let hex = random_hex_color();
    let mut embed = json!({
        "description": format!("**`color: #{hex}`**"),
        "color": u32::from_str_radix(&hex, 16).unwrap_or_default(),
        "image": { "url": format!("https://singlecolorimage.com/get/{hex}/1280x720") },
    });
    if let Some(user) = author {
        embed["author"] = json!({ "name": user.display_name(), "icon_url": user.avatar_url() });
    }
    embed
}

fn regenerate_row() -> Value {
    json!({
        "type": 1,
        "components": [{ "type": 2, "style": 1, "label": "Regenerate", "custom_id": REGENERATE_BUTTON }]
    })
}

fn color_command() -> CommandDescriptor {
    CommandDescriptor::slash("color", "Generate a random color.").handler(handler_fn(|i, _| async move {
        Ok(InteractionResponse::embed(color_card(i.author())).with_component_row(regenerate_row()))
    }))
}

// ---------------------------------------------------------------------------
// purge
// ---------------------------------------------------------------------------

fn purge_command() -> CommandDescriptor {
    CommandDescriptor::slash("purge", "Purge messages from the channel.")
        .option(
            OptionSpec::integer("limit", "The number of messages to purge.")
                .required()
                .min_value(2.0)
                .max_value(100.0),
        )
        .dm_permission(false)
        .default_member_permissions(MANAGE_MESSAGES)
        .check(check_fn(|i: Interaction| async move { Ok(i.in_guild()) }))
        .handler(handler_fn(|_, args| async move {
            let limit = args.first().and_then(Argument::as_i64).unwrap_or_default();
            Ok(InteractionResponse::ephemeral(format!("Purging {limit} messages.")))
        }))
}

// ---------------------------------------------------------------------------
// context menus
// ---------------------------------------------------------------------------

fn avatar_command() -> CommandDescriptor {
    CommandDescriptor::user("avatar").handler(handler_fn(|_, args| async move {
        let Some(user) = args.first().and_then(Argument::as_user) else {
            return Ok(InteractionResponse::ephemeral("Could not find that user."));
        };
        Ok(match user.avatar_url() {
            Some(url) => InteractionResponse::embed(json!({ "image": { "url": url } })),
            None => InteractionResponse::ephemeral(format!("{} has no avatar.", user.display_name())),
        })
    }))
}

fn word_count_command() -> CommandDescriptor {
    CommandDescriptor::message("Word Count").handler(handler_fn(|_, args| async move {
        let content = args
            .first()
            .and_then(Argument::as_message)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(InteractionResponse::ephemeral("That message has no text content."));
        }
        Ok(InteractionResponse::ephemeral(format!("{} words.", content.split_whitespace().count())))
    }))
}

// ---------------------------------------------------------------------------
// tag
// ---------------------------------------------------------------------------

fn tag_command() -> CommandDescriptor {
    let get = CommandDescriptor::slash("get", "Show a tag.")
        .option(OptionSpec::string("name", "Tag name").required())
        .autocomplete("name", autocomplete_fn(|_, value| async move { Ok(tag_choices(&value)) }))
        .handler(handler_fn(|_, args| async move {
            let name = args.first().and_then(Argument::as_str).unwrap_or_default().to_string();
            Ok(match TAGS.iter().find(|(tag, _)| *tag == name) {
                Some((_, text)) => InteractionResponse::message(*text),
                None => InteractionResponse::ephemeral(format!("No tag named `{name}`.")),
            })
        }));
    let list = CommandDescriptor::slash("list", "List every tag.").handler(handler_fn(|_, _| async move {
        let names: Vec<_> = TAGS.iter().map(|(tag, _)| format!("`{tag}`")).collect();
        Ok(InteractionResponse::ephemeral(names.join(", ")))
    }));

    CommandDescriptor::slash("tag", "Saved answers.").subcommand(get).subcommand(list)
}

fn tag_choices(value: &Value) -> Vec<AutocompleteChoice> {
    let prefix = value.as_str().unwrap_or_default().to_lowercase();
    TAGS.iter()
        .filter(|(tag, _)| tag.starts_with(&prefix))
        .map(|(tag, _)| AutocompleteChoice::new(*tag, *tag))
        .collect()
}

fn text_input_row(custom_id: &str, label: &str, style: u8) -> Value {
    json!({
        "type": 1,
        "components": [{ "type": 4, "custom_id": custom_id, "label": label, "style": style }]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookforge_gateway::RestClient;

    #[test]
    fn registers_commands_and_components() {
        let mut ctx = AppContext::new(RestClient::new("http://127.0.0.1:9", "1", "token"));
        register(&mut ctx);
        assert_eq!(ctx.commands.len(), 6);
        assert_eq!(ctx.components.len(), 2);
        assert_eq!(ctx.commands.queued().len(), 6);
    }

    #[test]
    fn tag_autocomplete_filters_by_prefix() {
        let names: Vec<_> = tag_choices(&json!("r")).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["rules", "release"]);
        assert_eq!(tag_choices(&Value::Null).len(), TAGS.len());
    }

    #[test]
    fn color_card_is_six_hex_digits() {
        let card = color_card(None);
        let description = card["description"].as_str().unwrap();
        let hex = description.trim_start_matches("**`color: #").trim_end_matches("`**");
        assert_eq!(hex.len(), 6);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
