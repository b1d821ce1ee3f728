pub mod checks;
pub mod components;
pub mod handler;
pub mod registry;
pub mod resolver;
pub mod sync;
pub mod types;

pub use checks::{CheckOutcome, CheckRunner};
pub use components::{ComponentDescriptor, ComponentHandle, ComponentKind, ComponentRegistry, ModalField};
pub use handler::{
    autocomplete_fn, check_fn, handler_fn, AutocompleteHandler, Check, InteractionHandler,
};
pub use registry::{CommandHandle, CommandRegistry, RegistryError, SyncReport};
pub use resolver::{resolve_modal, ParameterResolver, ResolutionError, ResolutionFailure};
pub use sync::{command_to_wire, static_command_to_wire, CommandRegistrar, RegisteredCommand};
pub use types::{Argument, CommandDescriptor, CommandKey, OptionSpec, SyncState};
