//! Outbound REST client.
//!
//! Only the calls the engine itself needs: bulk command registration,
//! administrative command deletion, and plain channel messages for sync
//! notices.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use hookforge_commands::{CommandRegistrar, RegisteredCommand};
use reqwest::Client;
use serde_json::Value;
use tracing::{error, info};

#[derive(Clone)]
pub struct RestClient {
    http: Client,
    api_base: String,
    application_id: String,
    token: String,
}

impl RestClient {
    pub fn new(
        api_base: impl Into<String>,
        application_id: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            application_id: application_id.into(),
            token: token.into(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Bot {}", self.token)
    }

    /// Global command collection, or a guild's when `guild_id` is set.
    pub fn commands_url(&self, guild_id: Option<&str>) -> String {
        match guild_id {
            Some(guild) => format!(
                "{}/applications/{}/guilds/{}/commands",
                self.api_base, self.application_id, guild
            ),
            None => format!("{}/applications/{}/commands", self.api_base, self.application_id),
        }
    }

    /// Delete one registered command.
    pub async fn delete_command(&self, command_id: &str, guild_id: Option<&str>) -> Result<()> {
        let url = format!("{}/{}", self.commands_url(guild_id), command_id);
        let res = self
            .http
            .delete(&url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let err = res.text().await.unwrap_or_default();
            error!("[Rest] delete command {} failed ({}): {}", command_id, status, err);
            bail!("delete command {} failed ({}): {}", command_id, status, err);
        }
        info!("[Rest] deleted command {}", command_id);
        Ok(())
    }

    /// Post a message to a channel.
    pub async fn send_message(&self, channel_id: &str, payload: &Value) -> Result<()> {
        let url = format!("{}/channels/{}/messages", self.api_base, channel_id);
        let res = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(payload)
            .send()
            .await?;

        if !res.status().is_success() {
            let err = res.text().await.unwrap_or_default();
            bail!("send message to {} failed: {}", channel_id, err);
        }
        Ok(())
    }
}

#[async_trait]
impl CommandRegistrar for RestClient {
    async fn bulk_overwrite(&self, commands: Vec<Value>) -> Result<Vec<RegisteredCommand>> {
        let res = self
            .http
            .put(self.commands_url(None))
            .header(reqwest::header::AUTHORIZATION, self.auth_header())
            .json(&commands)
            .send()
            .await
            .context("bulk overwrite request failed")?;

        let status = res.status();
        if !status.is_success() {
            let err = res.text().await.unwrap_or_default();
            bail!("bulk overwrite rejected ({}): {}", status, err);
        }
        res.json::<Vec<RegisteredCommand>>()
            .await
            .context("bulk overwrite response was not a command list")
    }
}
