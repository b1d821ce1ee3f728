/// Handler, check, and autocomplete traits.
///
/// Registered callbacks are trait objects so the registries can hold
/// heterogeneous handlers. The `*_fn` adapters wrap async closures.
use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use hookforge_core::{AutocompleteChoice, Interaction, InteractionResponse};
use serde_json::Value;

use crate::types::Argument;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// The callback bound to a command, subcommand, or component.
///
/// `args` always has one entry per declared option (or modal field), in
/// declaration order.
#[async_trait]
pub trait InteractionHandler: Send + Sync {
    async fn handle(&self, interaction: &Interaction, args: Vec<Argument>) -> Result<InteractionResponse>;
}

/// A precondition evaluated before a handler runs.
///
/// `Ok(false)` fails the check set; `Err` is a contract violation and also
/// fails it.
#[async_trait]
pub trait Check: Send + Sync {
    async fn check(&self, interaction: &Interaction) -> Result<bool>;
}

/// Supplies suggestions for the option currently being typed.
#[async_trait]
pub trait AutocompleteHandler: Send + Sync {
    async fn complete(&self, interaction: &Interaction, value: &Value) -> Result<Vec<AutocompleteChoice>>;
}

// ---------------------------------------------------------------------------
// Closure adapters
// ---------------------------------------------------------------------------

struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> InteractionHandler for FnHandler<F>
where
    F: Fn(Interaction, Vec<Argument>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<InteractionResponse>> + Send + 'static,
{
    async fn handle(&self, interaction: &Interaction, args: Vec<Argument>) -> Result<InteractionResponse> {
        (self.0)(interaction.clone(), args).await
    }
}

/// Wrap an async closure as an [`InteractionHandler`].
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn InteractionHandler>
where
    F: Fn(Interaction, Vec<Argument>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<InteractionResponse>> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

struct FnCheck<F>(F);

#[async_trait]
impl<F, Fut> Check for FnCheck<F>
where
    F: Fn(Interaction) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<bool>> + Send + 'static,
{
    async fn check(&self, interaction: &Interaction) -> Result<bool> {
        (self.0)(interaction.clone()).await
    }
}

/// Wrap an async predicate as a [`Check`].
pub fn check_fn<F, Fut>(f: F) -> Arc<dyn Check>
where
    F: Fn(Interaction) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<bool>> + Send + 'static,
{
    Arc::new(FnCheck(f))
}

struct FnAutocomplete<F>(F);

#[async_trait]
impl<F, Fut> AutocompleteHandler for FnAutocomplete<F>
where
    F: Fn(Interaction, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<AutocompleteChoice>>> + Send + 'static,
{
    async fn complete(&self, interaction: &Interaction, value: &Value) -> Result<Vec<AutocompleteChoice>> {
        (self.0)(interaction.clone(), value.clone()).await
    }
}

/// Wrap an async closure as an [`AutocompleteHandler`].
pub fn autocomplete_fn<F, Fut>(f: F) -> Arc<dyn AutocompleteHandler>
where
    F: Fn(Interaction, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<AutocompleteChoice>>> + Send + 'static,
{
    Arc::new(FnAutocomplete(f))
}
