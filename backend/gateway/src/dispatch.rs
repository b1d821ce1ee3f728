//! Interaction dispatcher.
//!
//! Drives one request through verify → parse → route → lookup → checks →
//! resolve → invoke → respond. Only a signature rejection produces a non-200
//! status. Every other failure, including a verified body that does not
//! decode, becomes a benign 200 response so the platform does not redeliver
//! a request whose handler may already have had side effects.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use axum::http::StatusCode;
use futures::FutureExt;
use hookforge_commands::{
    resolve_modal, Argument, Check, CheckOutcome, CheckRunner, CommandDescriptor, ComponentKind,
    InteractionHandler, ParameterResolver, ResolutionError, ResolutionFailure,
};
use hookforge_core::{
    CommandData, ComponentData, ComponentType, Interaction, InteractionData, InteractionResponse,
    ModalData,
};
use hookforge_logging::{InteractionEvent, InteractionEventLogger};
use hookforge_security::SignatureVerifier;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use crate::context::AppContext;
use crate::error::DispatchError;

// ---------------------------------------------------------------------------
// Hooks
// ---------------------------------------------------------------------------

/// Rewrites a component custom id before lookup, e.g. to strip a dynamic
/// suffix down to the registered prefix.
pub type CustomIdTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Receives every resolution or handler failure, and verified bodies that
/// could not be decoded. `interaction` is `None` only in the latter case.
#[async_trait]
pub trait ErrorHook: Send + Sync {
    async fn on_error(&self, interaction: Option<&Interaction>, error: &DispatchError);
}

/// Text of the benign responses sent for failed dispatches.
#[derive(Debug, Clone)]
pub struct ResponseMessages {
    pub not_found: String,
    pub check_failed: String,
    pub error: String,
}

impl Default for ResponseMessages {
    fn default() -> Self {
        Self {
            not_found: "command not implemented!".into(),
            check_failed: "You cannot use this interaction.".into(),
            error: "Something went wrong while handling this interaction.".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Request / outcome
// ---------------------------------------------------------------------------

/// The parts of an inbound HTTP request the dispatcher reads.
#[derive(Debug, Clone, Copy)]
pub struct InboundRequest<'a> {
    pub signature: Option<&'a str>,
    pub timestamp: Option<&'a str>,
    pub body: &'a [u8],
}

/// Terminal state of one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Responded,
    Rejected,
    Malformed,
    NotFound,
    CheckFailed,
    ResolutionFailed,
    HandlerFailed,
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl From<&DispatchError> for DispatchState {
    fn from(error: &DispatchError) -> Self {
        match error {
            DispatchError::Unauthorized(_) => Self::Rejected,
            DispatchError::Malformed(_) => Self::Malformed,
            DispatchError::NotFound(_) => Self::NotFound,
            DispatchError::CheckFailed | DispatchError::CheckViolation(_) => Self::CheckFailed,
            DispatchError::Resolution(_) => Self::ResolutionFailed,
            DispatchError::Handler(_) | DispatchError::HandlerPanicked => Self::HandlerFailed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub status: StatusCode,
    pub state: DispatchState,
    /// `None` only for requests that failed signature verification.
    pub response: Option<InteractionResponse>,
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub struct Dispatcher {
    verifier: SignatureVerifier,
    messages: ResponseMessages,
    custom_id_transform: Option<CustomIdTransform>,
    error_hook: Option<Arc<dyn ErrorHook>>,
}

impl Dispatcher {
    pub fn new(verifier: SignatureVerifier) -> Self {
        Self {
            verifier,
            messages: ResponseMessages::default(),
            custom_id_transform: None,
            error_hook: None,
        }
    }

    pub fn with_messages(mut self, messages: ResponseMessages) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_custom_id_transform(mut self, transform: CustomIdTransform) -> Self {
        self.custom_id_transform = Some(transform);
        self
    }

    pub fn with_error_hook(mut self, hook: Arc<dyn ErrorHook>) -> Self {
        self.error_hook = Some(hook);
        self
    }

    /// Handle one request. Never fails: every error ends in an outcome.
    pub async fn dispatch(&self, ctx: &AppContext, request: InboundRequest<'_>) -> DispatchOutcome {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("interaction", %request_id);
        self.dispatch_inner(ctx, request, request_id).instrument(span).await
    }

    async fn dispatch_inner(
        &self,
        ctx: &AppContext,
        request: InboundRequest<'_>,
        request_id: Uuid,
    ) -> DispatchOutcome {
        let started = Instant::now();

        // Signature first: nothing else is looked at for an unsigned request.
        if let Err(e) = self.verifier.verify(request.timestamp, request.signature, request.body) {
            warn!("[Dispatch] rejecting request: {}", e);
            let error = DispatchError::from(e);
            return self.finish(request_id, None, "unknown", started, StatusCode::UNAUTHORIZED, None, Some(&error));
        }

        let interaction = match Interaction::from_slice(request.body) {
            Ok(i) => i,
            Err(e) => {
                // Signed by the platform, so this is a payload shape we do not
                // know yet. It still gets a normal callback.
                error!("[Dispatch] failed to parse verified body: {}", e);
                let error = DispatchError::from(e);
                if let Some(hook) = &self.error_hook {
                    hook.on_error(None, &error).await;
                }
                let response = InteractionResponse::ephemeral(&self.messages.error);
                return self.finish(request_id, None, "unknown", started, StatusCode::OK, Some(response), Some(&error));
            }
        };
        let kind = interaction.kind.to_string();
        debug!("[Dispatch] {} interaction {}", kind, interaction.id);

        match self.route(ctx, &interaction).await {
            Ok(response) => self.finish(request_id, Some(&interaction), &kind, started, StatusCode::OK, Some(response), None),
            Err(error) => {
                let response = self.failure_response(&interaction, &error);
                if matches!(DispatchState::from(&error), DispatchState::ResolutionFailed | DispatchState::HandlerFailed) {
                    error!("[Dispatch] interaction {} failed: {}", interaction.id, error);
                    if let Some(hook) = &self.error_hook {
                        hook.on_error(Some(&interaction), &error).await;
                    }
                } else {
                    info!("[Dispatch] interaction {} not handled: {}", interaction.id, error);
                }
                self.finish(request_id, Some(&interaction), &kind, started, StatusCode::OK, Some(response), Some(&error))
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        request_id: Uuid,
        interaction: Option<&Interaction>,
        kind: &str,
        started: Instant,
        status: StatusCode,
        response: Option<InteractionResponse>,
        error: Option<&DispatchError>,
    ) -> DispatchOutcome {
        let state = error.map(DispatchState::from).unwrap_or(DispatchState::Responded);
        InteractionEventLogger::log_event(InteractionEvent {
            request_id: request_id.to_string(),
            interaction_id: interaction.map(|i| i.id.clone()),
            kind: kind.to_string(),
            state: state.to_string(),
            status: status.as_u16(),
            latency_ms: started.elapsed().as_millis() as u64,
            error: error.map(|e| e.to_string()),
        });
        DispatchOutcome { status, state, response }
    }

    /// Benign response for a failed dispatch. Never carries error details.
    fn failure_response(&self, interaction: &Interaction, error: &DispatchError) -> InteractionResponse {
        if matches!(interaction.data, InteractionData::Autocomplete(_)) {
            return InteractionResponse::autocomplete(Vec::new());
        }
        match DispatchState::from(error) {
            DispatchState::NotFound => InteractionResponse::ephemeral(&self.messages.not_found),
            DispatchState::CheckFailed => InteractionResponse::ephemeral(&self.messages.check_failed),
            _ => InteractionResponse::ephemeral(&self.messages.error),
        }
    }

    async fn route(&self, ctx: &AppContext, interaction: &Interaction) -> Result<InteractionResponse, DispatchError> {
        match &interaction.data {
            InteractionData::Ping => Ok(InteractionResponse::pong()),
            InteractionData::ApplicationCommand(data) => self.run_command(ctx, interaction, data).await,
            InteractionData::Autocomplete(data) => self.run_autocomplete(ctx, interaction, data).await,
            InteractionData::Component(data) => self.run_component(ctx, interaction, data).await,
            InteractionData::ModalSubmit(data) => self.run_modal(ctx, interaction, data).await,
        }
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// The descriptor to run plus the checks that guard it: the parent's,
    /// then the subcommand's own. Descends at most one level.
    fn command_target<'a>(
        ctx: &'a AppContext,
        data: &CommandData,
    ) -> Result<(&'a CommandDescriptor, Vec<Arc<dyn Check>>), DispatchError> {
        let cmd = ctx
            .commands
            .find(data)
            .ok_or_else(|| DispatchError::NotFound(format!("command `{}` ({})", data.name, data.id)))?;

        let mut checks = cmd.checks.clone();
        if data.kind != hookforge_core::CommandType::ChatInput {
            return Ok((cmd, checks));
        }
        match data.subcommand() {
            Some(sub) => {
                let target = cmd.subcommands.get(&sub.name).ok_or_else(|| {
                    DispatchError::NotFound(format!("subcommand `{} {}`", data.name, sub.name))
                })?;
                checks.extend(target.checks.iter().cloned());
                Ok((target, checks))
            }
            None => Ok((cmd, checks)),
        }
    }

    async fn run_command(
        &self,
        ctx: &AppContext,
        interaction: &Interaction,
        data: &CommandData,
    ) -> Result<InteractionResponse, DispatchError> {
        let (target, checks) = Self::command_target(ctx, data)?;
        let handler = target
            .handler
            .as_ref()
            .ok_or_else(|| DispatchError::NotFound(format!("handler for `{}`", target.name)))?;

        run_checks(&checks, interaction).await?;

        let resolver = ParameterResolver::new(&data.resolved, interaction.in_guild());
        let args = if data.kind == hookforge_core::CommandType::ChatInput {
            resolver.resolve_options(&target.options, data.leaf_options())?
        } else {
            vec![resolver.resolve_target(data)?]
        };

        invoke(handler.as_ref(), interaction, args).await
    }

    /// Autocomplete sees only the focused option's raw value; the resolved
    /// side-table is never consulted.
    async fn run_autocomplete(
        &self,
        ctx: &AppContext,
        interaction: &Interaction,
        data: &CommandData,
    ) -> Result<InteractionResponse, DispatchError> {
        let (target, _) = Self::command_target(ctx, data)?;
        let Some(focused) = data.focused_option() else {
            return Ok(InteractionResponse::autocomplete(Vec::new()));
        };
        let Some(handler) = target.autocompletes.get(&focused.name) else {
            debug!("[Dispatch] no autocomplete for `{}` on `{}`", focused.name, target.name);
            return Ok(InteractionResponse::autocomplete(Vec::new()));
        };

        let value = focused.value.clone().unwrap_or(serde_json::Value::Null);
        match AssertUnwindSafe(handler.complete(interaction, &value)).catch_unwind().await {
            Ok(Ok(choices)) => Ok(InteractionResponse::autocomplete(choices)),
            Ok(Err(e)) => Err(DispatchError::Handler(e)),
            Err(_) => Err(DispatchError::HandlerPanicked),
        }
    }

    // -----------------------------------------------------------------------
    // Components
    // -----------------------------------------------------------------------

    fn component_id(&self, raw: &str) -> String {
        match &self.custom_id_transform {
            Some(transform) => transform(raw),
            None => raw.to_string(),
        }
    }

    async fn run_component(
        &self,
        ctx: &AppContext,
        interaction: &Interaction,
        data: &ComponentData,
    ) -> Result<InteractionResponse, DispatchError> {
        let custom_id = self.component_id(&data.custom_id);
        let component = ctx
            .components
            .lookup(&custom_id)
            .ok_or_else(|| DispatchError::NotFound(format!("component `{}`", custom_id)))?;

        run_checks(&component.checks, interaction).await?;

        let args = match data.component_type {
            ComponentType::Button => Vec::new(),
            ty if ty.is_select() => {
                let values = ParameterResolver::new(&data.resolved, interaction.in_guild()).resolve_select(data)?;
                vec![Argument::List(values)]
            }
            other => {
                return Err(DispatchError::Resolution(ResolutionError {
                    field: custom_id,
                    reason: ResolutionFailure::TypeMismatch {
                        expected: "button or select".into(),
                        found: other.to_string(),
                    },
                }))
            }
        };

        invoke(component.handler.as_ref(), interaction, args).await
    }

    async fn run_modal(
        &self,
        ctx: &AppContext,
        interaction: &Interaction,
        data: &ModalData,
    ) -> Result<InteractionResponse, DispatchError> {
        let custom_id = self.component_id(&data.custom_id);
        let component = ctx
            .components
            .lookup(&custom_id)
            .ok_or_else(|| DispatchError::NotFound(format!("modal `{}`", custom_id)))?;

        run_checks(&component.checks, interaction).await?;

        let args = match &component.kind {
            ComponentKind::Modal(fields) => resolve_modal(fields, data)?,
            _ => Vec::new(),
        };

        invoke(component.handler.as_ref(), interaction, args).await
    }
}

async fn run_checks(checks: &[Arc<dyn Check>], interaction: &Interaction) -> Result<(), DispatchError> {
    match CheckRunner::run(checks, interaction).await {
        CheckOutcome::Passed => Ok(()),
        CheckOutcome::Failed => Err(DispatchError::CheckFailed),
        CheckOutcome::Violated(msg) => Err(DispatchError::CheckViolation(msg)),
    }
}

/// Call a handler inside a failure boundary: errors and panics both become
/// `DispatchError`s.
async fn invoke(
    handler: &dyn InteractionHandler,
    interaction: &Interaction,
    args: Vec<Argument>,
) -> Result<InteractionResponse, DispatchError> {
    match AssertUnwindSafe(handler.handle(interaction, args)).catch_unwind().await {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(e)) => Err(DispatchError::Handler(e)),
        Err(_) => Err(DispatchError::HandlerPanicked),
    }
}
