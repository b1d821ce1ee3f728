//! Per-process application context handed to the dispatcher on every request.

use anyhow::Result;
use hookforge_commands::{
    CommandDescriptor, CommandHandle, CommandKey, CommandRegistry, ComponentDescriptor,
    ComponentHandle, ComponentRegistry, RegistryError, SyncReport,
};
use tracing::info;

use crate::rest::RestClient;

/// Registries plus the outbound client.
///
/// Populated during startup, then shared read-only behind an `Arc` while
/// serving. Registration while traffic is being served is not supported.
pub struct AppContext {
    pub commands: CommandRegistry,
    pub components: ComponentRegistry,
    pub rest: RestClient,
}

impl AppContext {
    pub fn new(rest: RestClient) -> Self {
        Self { commands: CommandRegistry::new(), components: ComponentRegistry::new(), rest }
    }

    pub fn command(&mut self, descriptor: CommandDescriptor) -> CommandHandle {
        self.commands.register(descriptor)
    }

    pub fn component(&mut self, descriptor: ComponentDescriptor) -> ComponentHandle {
        self.components.register(descriptor)
    }

    /// Bulk-register queued commands through the REST client.
    pub async fn sync_commands(&mut self) -> Result<SyncReport, RegistryError> {
        self.commands.sync(&self.rest).await
    }

    /// Remove a command locally and, when it was synced, remotely.
    ///
    /// Returns the removed descriptor, or `None` when nothing was registered
    /// under `key`. The local entry is dropped even if the remote call fails.
    pub async fn delete_command(&mut self, key: &CommandKey) -> Result<Option<CommandDescriptor>> {
        let Some(descriptor) = self.commands.remove(key) else {
            return Ok(None);
        };
        if let Some(remote_id) = descriptor.remote_id() {
            self.rest.delete_command(remote_id, None).await?;
        }
        info!("[Commands] deleted {}", key);
        Ok(Some(descriptor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookforge_core::CommandType;

    #[tokio::test]
    async fn deleting_unsynced_command_skips_remote_call() {
        // The REST client points nowhere; an attempted call would fail.
        let mut ctx = AppContext::new(RestClient::new("http://127.0.0.1:9", "1", "token"));
        let handle = ctx.command(CommandDescriptor::slash("temp", "t"));

        let removed = ctx.delete_command(handle.key()).await.unwrap();

        assert_eq!(removed.map(|d| d.name), Some("temp".to_string()));
        assert!(ctx.commands.is_empty());
        assert!(ctx
            .delete_command(&CommandKey::new("temp", CommandType::ChatInput))
            .await
            .unwrap()
            .is_none());
    }
}
