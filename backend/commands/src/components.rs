/// Interactive component registry.
///
/// Components (buttons, selects, modals) are keyed by their custom id.
/// Registering a custom id that is already present replaces the earlier
/// descriptor; the last registration wins.
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use hookforge_core::ComponentType;
use tracing::{debug, warn};

use crate::handler::{Check, InteractionHandler};
use crate::types::Argument;

/// One declared text input of a modal.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalField {
    pub custom_id: String,
    pub required: bool,
    pub default: Argument,
}

impl ModalField {
    pub fn new(custom_id: impl Into<String>) -> Self {
        Self { custom_id: custom_id.into(), required: false, default: Argument::Absent }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, default: impl Into<Argument>) -> Self {
        self.default = default.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComponentKind {
    Button,
    /// Which select variant; values are resolved per the wire component type.
    Select(ComponentType),
    /// Declared field order for argument binding.
    Modal(Vec<ModalField>),
}

#[derive(Clone)]
pub struct ComponentDescriptor {
    pub custom_id: String,
    pub kind: ComponentKind,
    pub checks: Vec<Arc<dyn Check>>,
    pub handler: Arc<dyn InteractionHandler>,
}

impl ComponentDescriptor {
    pub fn button(custom_id: impl Into<String>, handler: Arc<dyn InteractionHandler>) -> Self {
        Self::new(custom_id, ComponentKind::Button, handler)
    }

    pub fn select(
        custom_id: impl Into<String>,
        variant: ComponentType,
        handler: Arc<dyn InteractionHandler>,
    ) -> Self {
        Self::new(custom_id, ComponentKind::Select(variant), handler)
    }

    pub fn modal(
        custom_id: impl Into<String>,
        fields: Vec<ModalField>,
        handler: Arc<dyn InteractionHandler>,
    ) -> Self {
        Self::new(custom_id, ComponentKind::Modal(fields), handler)
    }

    fn new(custom_id: impl Into<String>, kind: ComponentKind, handler: Arc<dyn InteractionHandler>) -> Self {
        Self { custom_id: custom_id.into(), kind, checks: Vec::new(), handler }
    }

    pub fn check(mut self, check: Arc<dyn Check>) -> Self {
        self.checks.push(check);
        self
    }
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("custom_id", &self.custom_id)
            .field("kind", &self.kind)
            .field("checks", &self.checks.len())
            .finish_non_exhaustive()
    }
}

/// Opaque handle returned by [`ComponentRegistry::register`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentHandle(String);

impl ComponentHandle {
    pub fn custom_id(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Default)]
pub struct ComponentRegistry {
    components: HashMap<String, ComponentDescriptor>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component. Replaces any component with the same custom id.
    pub fn register(&mut self, descriptor: ComponentDescriptor) -> ComponentHandle {
        let custom_id = descriptor.custom_id.clone();
        if self.components.insert(custom_id.clone(), descriptor).is_some() {
            warn!("[Components] custom id `{}` re-registered; previous handler replaced", custom_id);
        } else {
            debug!("[Components] registered `{}`", custom_id);
        }
        ComponentHandle(custom_id)
    }

    pub fn lookup(&self, custom_id: &str) -> Option<&ComponentDescriptor> {
        self.components.get(custom_id)
    }

    pub fn remove(&mut self, handle: &ComponentHandle) -> Option<ComponentDescriptor> {
        self.components.remove(handle.custom_id())
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
