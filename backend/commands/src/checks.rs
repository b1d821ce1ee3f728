/// Concurrent precondition execution.
///
/// Every check in a set is started before any result is looked at, and all
/// of them run to completion even when one has already failed: checks may
/// have side effects and each must observe the interaction.
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::future::join_all;
use futures::FutureExt;
use hookforge_core::Interaction;
use tracing::{debug, warn};

use crate::handler::Check;

/// Reduced result of a check set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Passed,
    /// At least one check returned `false`.
    Failed,
    /// At least one check errored or panicked. Carries the first message.
    Violated(String),
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

pub struct CheckRunner;

impl CheckRunner {
    /// Run `checks` concurrently against `interaction` and reduce to one outcome.
    /// An empty set passes.
    pub async fn run(checks: &[Arc<dyn Check>], interaction: &Interaction) -> CheckOutcome {
        if checks.is_empty() {
            return CheckOutcome::Passed;
        }

        let results = join_all(
            checks
                .iter()
                .map(|check| AssertUnwindSafe(check.check(interaction)).catch_unwind()),
        )
        .await;

        let mut failed = false;
        let mut violation = None;
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(Ok(true)) => {}
                Ok(Ok(false)) => {
                    debug!("[Checks] check #{} returned false for interaction {}", index, interaction.id);
                    failed = true;
                }
                Ok(Err(e)) => {
                    warn!("[Checks] check #{} errored for interaction {}: {:#}", index, interaction.id, e);
                    violation.get_or_insert_with(|| e.to_string());
                }
                Err(_) => {
                    warn!("[Checks] check #{} panicked for interaction {}", index, interaction.id);
                    violation.get_or_insert_with(|| "check panicked".to_string());
                }
            }
        }

        match (violation, failed) {
            (Some(msg), _) => CheckOutcome::Violated(msg),
            (None, true) => CheckOutcome::Failed,
            (None, false) => CheckOutcome::Passed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::check_fn;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Barrier;

    fn ping() -> Interaction {
        serde_json::from_value(serde_json::json!({
            "id": "1", "application_id": "2", "type": 1, "token": "t"
        }))
        .unwrap()
    }

    fn constant(value: bool, counter: Arc<AtomicUsize>) -> Arc<dyn Check> {
        check_fn(move |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(value)
            }
        })
    }

    #[tokio::test]
    async fn all_true_passes() {
        let count = Arc::new(AtomicUsize::new(0));
        let checks = vec![constant(true, count.clone()), constant(true, count.clone())];
        assert_eq!(CheckRunner::run(&checks, &ping()).await, CheckOutcome::Passed);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failure_does_not_short_circuit() {
        let count = Arc::new(AtomicUsize::new(0));
        let checks = vec![constant(false, count.clone()), constant(true, count.clone())];
        assert_eq!(CheckRunner::run(&checks, &ping()).await, CheckOutcome::Failed);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn error_is_a_violation() {
        let count = Arc::new(AtomicUsize::new(0));
        let checks = vec![
            check_fn(|_| async { anyhow::bail!("database unavailable") }),
            constant(true, count.clone()),
        ];
        let outcome = CheckRunner::run(&checks, &ping()).await;
        assert_eq!(outcome, CheckOutcome::Violated("database unavailable".into()));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn checks_run_concurrently() {
        // Each check waits for the other; sequential execution would never finish.
        let barrier = Arc::new(Barrier::new(2));
        let make = |barrier: Arc<Barrier>| {
            check_fn(move |_| {
                let barrier = barrier.clone();
                async move {
                    barrier.wait().await;
                    Ok(true)
                }
            })
        };
        let checks = vec![make(barrier.clone()), make(barrier.clone())];
        let outcome = tokio::time::timeout(Duration::from_secs(2), CheckRunner::run(&checks, &ping()))
            .await
            .expect("checks were run sequentially");
        assert!(outcome.passed());
    }

    #[tokio::test]
    async fn empty_set_passes() {
        assert!(CheckRunner::run(&[], &ping()).await.passed());
    }
}
