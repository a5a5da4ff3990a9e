//! Core orchestrator: concurrent multi-provider fan-out under nested
//! deadlines, fan-in through a bounded channel, then fold.
//!
//! Every dispatched provider yields exactly one [`Outcome`] in the response:
//! either the one its task reported before the cutoff, a synthetic timeout
//! for a task that was still running when the global budget ran out, or an
//! error for a task that panicked.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::FederationConfig;
use crate::deadline::Deadline;
use crate::error::{FederationError, ProviderError};
use crate::provider::SearchProvider;
use crate::registry::ProviderRegistry;
use crate::types::{Failure, Outcome, Query, SearchResponse};

use super::aggregate::fold;

/// Runs federated searches against a shared provider registry.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    registry: Arc<ProviderRegistry>,
    config: FederationConfig,
}

impl Orchestrator {
    /// Create an orchestrator.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::Config`] if `config` fails validation.
    pub fn new(registry: Arc<ProviderRegistry>, config: FederationConfig) -> Result<Self, FederationError> {
        config.validate()?;
        Ok(Self { registry, config })
    }

    /// The registry this orchestrator dispatches to.
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// The active configuration.
    pub fn config(&self) -> &FederationConfig {
        &self.config
    }

    /// Run `query` against its providers and fold the outcomes.
    ///
    /// # Pipeline
    ///
    /// 1. Resolve the dispatch set (all providers when the query names none;
    ///    unknown ids are skipped with a warning)
    /// 2. Derive the fan-out deadline from `parent` and the global budget,
    ///    and one nested deadline per provider task
    /// 3. Spawn one task per provider; each sends exactly one outcome
    /// 4. Collect until every task reported or the fan-out deadline fires
    /// 5. Cancel and abort stragglers and record each as a timeout; a task
    ///    that panicked is recorded as an error
    /// 6. Fold into a [`SearchResponse`]
    ///
    /// Dropping the returned future cancels every in-flight provider task.
    ///
    /// # Errors
    ///
    /// Returns [`FederationError::Registry`] if no provider is registered.
    /// Provider failures never produce an error; they are recorded in the
    /// response partitions.
    pub async fn run(&self, parent: &Deadline, query: &Query) -> Result<SearchResponse, FederationError> {
        if self.registry.is_empty() {
            return Err(FederationError::Registry("no providers registered".into()));
        }

        let started = Instant::now();
        let dispatch = self.registry.resolve(query.providers());
        let max_results = self.config.effective_result_cap(query.result_cap());
        let fanout = parent.child(self.config.global_timeout());
        let _cancel_on_drop = fanout.token().clone().drop_guard();

        tracing::trace!(query = query.text(), "federated search");
        tracing::debug!(
            providers = dispatch.len(),
            max_results,
            budget_ms = fanout.remaining().as_millis() as u64,
            "dispatching providers"
        );

        // Capacity equals the dispatch count so no task ever waits on a send.
        let (tx, mut rx) = mpsc::channel::<Outcome>(dispatch.len().max(1));
        let mut tasks = Vec::with_capacity(dispatch.len());

        for (id, provider) in &dispatch {
            let deadline = fanout.child(self.config.per_provider_timeout());
            let tx = tx.clone();
            let id = id.clone();
            let provider = Arc::clone(provider);
            let text = query.text().to_owned();

            tasks.push(tokio::spawn(async move {
                let outcome = fetch_outcome(id, provider, deadline, text, max_results).await;
                if let Err(late) = tx.try_send(outcome) {
                    tracing::trace!(error = %late, "outcome discarded after collection stopped");
                }
            }));
        }
        drop(tx);

        let mut collected: Vec<Outcome> = Vec::with_capacity(dispatch.len());
        let cutoff = fanout.expired();
        tokio::pin!(cutoff);
        // Set once every task has dropped its sender, i.e. every task is ending.
        let mut drained = false;

        while collected.len() < dispatch.len() {
            tokio::select! {
                biased;
                received = rx.recv() => match received {
                    Some(outcome) => {
                        log_outcome(&outcome);
                        collected.push(outcome);
                    }
                    None => {
                        drained = true;
                        break;
                    }
                },
                () = &mut cutoff => {
                    tracing::warn!(
                        reported = collected.len(),
                        dispatched = dispatch.len(),
                        "global deadline reached before all providers reported"
                    );
                    break;
                }
            }
        }

        fanout.cancel();
        rx.close();

        let reported: HashSet<String> = collected.iter().map(|o| o.provider.clone()).collect();
        let total_elapsed = started.elapsed();
        for ((id, _), task) in dispatch.iter().zip(tasks) {
            if reported.contains(id) {
                task.abort();
                continue;
            }
            let outcome = unreported_outcome(id, task, drained, total_elapsed).await;
            log_outcome(&outcome);
            collected.push(outcome);
        }

        let response = fold(collected, total_elapsed, dispatch.len());

        tracing::info!(
            elapsed_ms = response.total_elapsed.as_millis() as u64,
            results = response.total_count(),
            success = response.success_providers.len(),
            timeout = response.timeout_providers.len(),
            error = response.error_providers.len(),
            "search completed"
        );

        Ok(response)
    }
}

/// Run one provider under its own deadline and classify the result.
///
/// The provider future is dropped as soon as the deadline fires or the
/// fan-out is cancelled. An error that arrives after the deadline already
/// passed is classified as a timeout regardless of its kind.
async fn fetch_outcome(
    id: String,
    provider: Arc<dyn SearchProvider>,
    deadline: Deadline,
    query: String,
    max_results: usize,
) -> Outcome {
    let started = Instant::now();

    let fetched = tokio::select! {
        biased;
        result = provider.fetch(&deadline, &query, max_results) => Some(result),
        () = deadline.expired() => None,
    };
    let elapsed = started.elapsed();

    match fetched {
        Some(Ok(mut results)) => {
            results.truncate(max_results);
            Outcome::success(id, results, elapsed)
        }
        Some(Err(ProviderError::DeadlineExceeded)) | None => Outcome::timed_out(id, elapsed),
        Some(Err(_)) if deadline.is_elapsed() => Outcome::timed_out(id, elapsed),
        Some(Err(err)) => Outcome::errored(id, err.to_string(), elapsed),
    }
}

/// Classify a provider whose task sent no outcome before collection stopped.
///
/// A task that ended without reporting crashed, which is an error. One
/// still running is aborted and counted as a timeout. `ending` means the
/// task already dropped its sender and is only unwinding.
async fn unreported_outcome(id: &str, task: JoinHandle<()>, ending: bool, elapsed: Duration) -> Outcome {
    if !ending && !task.is_finished() {
        task.abort();
        tracing::debug!(provider = %id, "provider still running at cutoff");
        return Outcome::timed_out(id, elapsed);
    }
    match task.await {
        Err(err) if err.is_panic() => Outcome::errored(id, "provider panicked", elapsed),
        // Finished after the cutoff; its outcome went to the closed channel.
        _ => Outcome::timed_out(id, elapsed),
    }
}

fn log_outcome(outcome: &Outcome) {
    let elapsed_ms = outcome.elapsed.as_millis() as u64;
    match &outcome.failure {
        None => tracing::debug!(
            provider = %outcome.provider,
            count = outcome.results.len(),
            elapsed_ms,
            "provider returned results"
        ),
        Some(Failure::Timeout) => tracing::warn!(provider = %outcome.provider, elapsed_ms, "provider timed out"),
        Some(Failure::Error(detail)) => {
            tracing::warn!(provider = %outcome.provider, error = %detail, elapsed_ms, "provider failed")
        }
    }
}
