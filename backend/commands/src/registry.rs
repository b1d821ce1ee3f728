/// Application command registry with a pending-sync queue.
///
/// Commands are registered at startup, queued, and pushed to the platform
/// in one bulk-replace call by [`CommandRegistry::sync`]. Rows the platform
/// echoes back are matched to local descriptors by name and category.
use std::collections::HashMap;

use hookforge_core::{CommandData, Snowflake};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::sync::{command_to_wire, static_command_to_wire, CommandRegistrar};
use crate::types::{CommandDescriptor, CommandKey, SyncState};

#[derive(Debug, Error)]
pub enum RegistryError {
    /// The bulk call failed. The queue is left intact for a later attempt.
    #[error("bulk command registration failed: {0:#}")]
    Transport(anyhow::Error),
}

/// Outcome of one successful sync round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Descriptors that received a remote id.
    pub synced: Vec<CommandKey>,
    /// Response rows with no matching queued descriptor.
    pub unmatched: Vec<String>,
    /// Queued descriptors the response did not mention.
    pub missing: Vec<CommandKey>,
}

/// Opaque handle returned by [`CommandRegistry::register`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandHandle(CommandKey);

impl CommandHandle {
    pub fn key(&self) -> &CommandKey {
        &self.0
    }
}

#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: HashMap<CommandKey, CommandDescriptor>,
    /// Commands bound to an already-registered remote id; never synced.
    static_commands: HashMap<Snowflake, CommandDescriptor>,
    /// Ordered keys awaiting bulk registration.
    queue: Vec<CommandKey>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a descriptor under its name and category and queue it for sync.
    pub fn register(&mut self, mut descriptor: CommandDescriptor) -> CommandHandle {
        let key = descriptor.key();
        descriptor.sync_state = SyncState::Queued;
        if self.commands.insert(key.clone(), descriptor).is_some() {
            warn!("[Commands] {} re-registered; previous descriptor replaced", key);
        }
        if !self.queue.contains(&key) {
            self.queue.push(key.clone());
        }
        debug!("[Commands] registered {} ({} queued)", key, self.queue.len());
        CommandHandle(key)
    }

    /// Bind a descriptor to a command that already exists remotely under
    /// `remote_id`. Static commands are looked up by id and never queued, but
    /// every sync resends them with their id so the bulk replace keeps them.
    pub fn register_static(&mut self, remote_id: impl Into<Snowflake>, mut descriptor: CommandDescriptor) {
        let remote_id = remote_id.into();
        descriptor.sync_state = SyncState::Synced(remote_id.clone());
        debug!("[Commands] static command {} bound to {}", descriptor.name, remote_id);
        self.static_commands.insert(remote_id, descriptor);
    }

    pub fn lookup(&self, key: &CommandKey) -> Option<&CommandDescriptor> {
        self.commands.get(key)
    }

    pub fn lookup_static(&self, remote_id: &str) -> Option<&CommandDescriptor> {
        self.static_commands.get(remote_id)
    }

    /// Descriptor for an inbound command: by name and category first, then
    /// by remote id for static commands.
    pub fn find(&self, data: &CommandData) -> Option<&CommandDescriptor> {
        self.lookup(&CommandKey::new(data.name.clone(), data.kind))
            .or_else(|| self.lookup_static(&data.id))
    }

    /// Administrative removal. Also drops the key from the sync queue.
    pub fn remove(&mut self, key: &CommandKey) -> Option<CommandDescriptor> {
        self.queue.retain(|queued| queued != key);
        self.commands.remove(key)
    }

    pub fn queued(&self) -> &[CommandKey] {
        &self.queue
    }

    pub fn len(&self) -> usize {
        self.commands.len() + self.static_commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Push every queued descriptor to the platform in one bulk call.
    ///
    /// The bulk call replaces the whole remote set, so static commands ride
    /// along with their remote id and come back untouched. Response rows are
    /// matched by name and category, not position. Rows that match nothing
    /// are skipped. On success the queue is cleared; on
    /// transport failure it is left as it was and nothing is retried here.
    pub async fn sync(&mut self, registrar: &dyn CommandRegistrar) -> Result<SyncReport, RegistryError> {
        if self.queue.is_empty() {
            debug!("[Sync] nothing queued");
            return Ok(SyncReport::default());
        }

        let mut payload = self
            .queue
            .iter()
            .filter_map(|key| self.commands.get(key))
            .map(command_to_wire)
            .collect::<Vec<_>>();
        let mut statics: Vec<_> = self.static_commands.iter().collect();
        statics.sort_by(|a, b| a.0.cmp(b.0));
        payload.extend(statics.into_iter().map(|(id, cmd)| static_command_to_wire(id, cmd)));

        info!(
            "[Sync] registering {} commands ({} static)",
            payload.len(),
            self.static_commands.len()
        );
        let rows = registrar
            .bulk_overwrite(payload)
            .await
            .map_err(RegistryError::Transport)?;

        let mut report = SyncReport::default();
        for row in rows {
            if self.static_commands.contains_key(&row.id) {
                debug!("[Sync] static command `{}` ({}) kept", row.name, row.id);
                continue;
            }
            let key = CommandKey::new(row.name.clone(), row.kind);
            let queued = self.queue.contains(&key);
            match self.commands.get_mut(&key).filter(|_| queued) {
                Some(descriptor) => {
                    descriptor.sync_state = SyncState::Synced(row.id);
                    report.synced.push(key);
                }
                None => {
                    warn!("[Sync] response row `{}` ({}) matches no queued command; skipping", row.name, row.id);
                    report.unmatched.push(row.name);
                }
            }
        }

        for key in std::mem::take(&mut self.queue) {
            if report.synced.contains(&key) {
                continue;
            }
            if let Some(descriptor) = self.commands.get_mut(&key) {
                warn!("[Sync] {} was not acknowledged by the platform", key);
                descriptor.sync_state = SyncState::Unsynced;
                report.missing.push(key);
            }
        }

        info!(
            synced = report.synced.len(),
            unmatched = report.unmatched.len(),
            missing = report.missing.len(),
            "[Sync] complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::RegisteredCommand;
    use anyhow::Result;
    use async_trait::async_trait;
    use hookforge_core::CommandType;
    use serde_json::Value;
    use std::sync::Mutex;

    /// Echoes a fixed response and records what it was sent.
    struct FakeRegistrar {
        response: Result<Vec<RegisteredCommand>, String>,
        sent: Mutex<Vec<Value>>,
    }

    impl FakeRegistrar {
        fn echo(rows: Vec<RegisteredCommand>) -> Self {
            Self { response: Ok(rows), sent: Mutex::new(Vec::new()) }
        }

        fn failing() -> Self {
            Self { response: Err("502 bad gateway".into()), sent: Mutex::new(Vec::new()) }
        }
    }

    #[async_trait]
    impl CommandRegistrar for FakeRegistrar {
        async fn bulk_overwrite(&self, commands: Vec<Value>) -> Result<Vec<RegisteredCommand>> {
            self.sent.lock().unwrap().extend(commands);
            self.response.clone().map_err(anyhow::Error::msg)
        }
    }

    fn row(id: &str, name: &str, kind: CommandType) -> RegisteredCommand {
        RegisteredCommand { id: id.into(), name: name.into(), kind }
    }

    #[test]
    fn same_name_different_category_are_distinct() {
        let mut registry = CommandRegistry::new();
        registry.register(CommandDescriptor::slash("avatar", "Show avatar"));
        registry.register(CommandDescriptor::user("avatar"));

        assert_eq!(registry.len(), 2);
        assert!(registry.lookup(&CommandKey::new("avatar", CommandType::ChatInput)).is_some());
        assert!(registry.lookup(&CommandKey::new("avatar", CommandType::User)).is_some());
        assert!(registry.lookup(&CommandKey::new("avatar", CommandType::Message)).is_none());
    }

    #[tokio::test]
    async fn sync_matches_by_name_and_skips_unknown_rows() {
        let mut registry = CommandRegistry::new();
        registry.register(CommandDescriptor::slash("alpha", "a"));
        registry.register(CommandDescriptor::slash("beta", "b"));
        registry.register(CommandDescriptor::slash("gamma", "c"));

        // Response order differs from queue order and contains a stranger.
        let registrar = FakeRegistrar::echo(vec![
            row("200", "beta", CommandType::ChatInput),
            row("999", "delta", CommandType::ChatInput),
            row("100", "alpha", CommandType::ChatInput),
        ]);

        let report = registry.sync(&registrar).await.unwrap();

        assert_eq!(registrar.sent.lock().unwrap().len(), 3);
        let id = |name: &str| {
            registry
                .lookup(&CommandKey::new(name, CommandType::ChatInput))
                .and_then(|d| d.remote_id().map(str::to_string))
        };
        assert_eq!(id("alpha").as_deref(), Some("100"));
        assert_eq!(id("beta").as_deref(), Some("200"));
        assert_eq!(id("gamma"), None);
        assert!(registry.queued().is_empty());
        assert_eq!(report.unmatched, vec!["delta".to_string()]);
        assert_eq!(report.missing, vec![CommandKey::new("gamma", CommandType::ChatInput)]);
    }

    #[tokio::test]
    async fn category_is_part_of_the_match() {
        let mut registry = CommandRegistry::new();
        registry.register(CommandDescriptor::user("inspect"));
        let registrar = FakeRegistrar::echo(vec![row("1", "inspect", CommandType::Message)]);

        let report = registry.sync(&registrar).await.unwrap();

        assert!(report.synced.is_empty());
        assert_eq!(report.unmatched, vec!["inspect".to_string()]);
    }

    #[tokio::test]
    async fn transport_failure_keeps_queue() {
        let mut registry = CommandRegistry::new();
        registry.register(CommandDescriptor::slash("alpha", "a"));

        let err = registry.sync(&FakeRegistrar::failing()).await.unwrap_err();

        assert!(err.to_string().contains("502"));
        assert_eq!(registry.queued().len(), 1);
        let desc = registry.lookup(&CommandKey::new("alpha", CommandType::ChatInput)).unwrap();
        assert_eq!(desc.sync_state, SyncState::Queued);
    }

    #[tokio::test]
    async fn empty_queue_makes_no_call() {
        let mut registry = CommandRegistry::new();
        let registrar = FakeRegistrar::failing();
        assert_eq!(registry.sync(&registrar).await.unwrap(), SyncReport::default());
        assert!(registrar.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn static_commands_resolve_by_remote_id() {
        let mut registry = CommandRegistry::new();
        registry.register_static("555", CommandDescriptor::slash("legacy", "old"));
        let data: CommandData = serde_json::from_value(serde_json::json!({
            "id": "555", "name": "renamed-remotely", "type": 1
        }))
        .unwrap();

        assert_eq!(registry.find(&data).unwrap().name, "legacy");
        assert!(registry.queued().is_empty());
    }

    #[tokio::test]
    async fn sync_resends_static_commands_with_their_id() {
        let mut registry = CommandRegistry::new();
        registry.register_static("555", CommandDescriptor::slash("legacy", "old"));
        registry.register(CommandDescriptor::slash("alpha", "a"));
        let registrar = FakeRegistrar::echo(vec![
            row("100", "alpha", CommandType::ChatInput),
            row("555", "legacy", CommandType::ChatInput),
        ]);

        let report = registry.sync(&registrar).await.unwrap();

        let sent = registrar.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0]["name"], "alpha");
        assert!(sent[0].get("id").is_none());
        assert_eq!(sent[1]["id"], "555");
        assert_eq!(sent[1]["name"], "legacy");

        assert_eq!(report.synced, vec![CommandKey::new("alpha", CommandType::ChatInput)]);
        assert!(report.unmatched.is_empty());
        assert!(report.missing.is_empty());
        assert_eq!(registry.lookup_static("555").unwrap().name, "legacy");
    }

    #[test]
    fn remove_drops_descriptor_and_queue_entry() {
        let mut registry = CommandRegistry::new();
        let handle = registry.register(CommandDescriptor::slash("temp", "t"));
        assert!(registry.remove(handle.key()).is_some());
        assert!(registry.queued().is_empty());
        assert!(registry.is_empty());
    }
}
