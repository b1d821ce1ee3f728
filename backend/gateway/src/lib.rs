//! HookForge gateway: verifies, dispatches, and answers interaction
//! requests, and talks back to the platform over REST.

pub mod context;
pub mod dispatch;
pub mod error;
pub mod rest;
pub mod server;

pub use context::AppContext;
pub use dispatch::{
    CustomIdTransform, DispatchOutcome, DispatchState, Dispatcher, ErrorHook, InboundRequest,
    ResponseMessages,
};
pub use error::DispatchError;
pub use rest::RestClient;
pub use server::{router, start_server, GatewayState};
