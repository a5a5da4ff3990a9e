//! Folding collected outcomes into one response.
//!
//! Pure and single-threaded. Results are concatenated in the order the
//! outcomes are given (arrival order); nothing is re-ranked or deduplicated.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use crate::types::{Failure, Outcome, SearchResponse};

/// Fold `outcomes` into a [`SearchResponse`].
///
/// `total_elapsed` is the orchestrator's wall-clock time since dispatch and
/// `providers_queried` the number of dispatched tasks; neither is derived
/// from the outcomes.
///
/// Each provider lands in exactly one partition set. If the same provider
/// shows up more than once, the set is chosen by precedence, not order:
/// success over error over timeout. Only its first successful outcome
/// contributes results.
pub fn fold<I>(outcomes: I, total_elapsed: Duration, providers_queried: usize) -> SearchResponse
where
    I: IntoIterator<Item = Outcome>,
{
    let mut results = Vec::new();
    let mut standing: BTreeMap<String, Standing> = BTreeMap::new();

    for outcome in outcomes {
        let rank = Standing::of(&outcome);
        let previous = standing.get(&outcome.provider).copied();
        if previous.is_some() {
            tracing::debug!(provider = %outcome.provider, "duplicate outcome");
        }
        if rank == Standing::Success && previous != Some(Standing::Success) {
            results.extend(outcome.results);
        }
        let best = previous.map_or(rank, |p| p.min(rank));
        standing.insert(outcome.provider, best);
    }

    let mut success_providers = BTreeSet::new();
    let mut timeout_providers = BTreeSet::new();
    let mut error_providers = BTreeSet::new();
    for (provider, rank) in standing {
        match rank {
            Standing::Success => success_providers.insert(provider),
            Standing::Error => error_providers.insert(provider),
            Standing::Timeout => timeout_providers.insert(provider),
        };
    }

    SearchResponse {
        results,
        success_providers,
        timeout_providers,
        error_providers,
        total_elapsed,
        providers_queried,
    }
}

/// Partition precedence for duplicate outcomes; lower wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Standing {
    Success,
    Error,
    Timeout,
}

impl Standing {
    fn of(outcome: &Outcome) -> Self {
        match outcome.failure {
            None => Self::Success,
            Some(Failure::Error(_)) => Self::Error,
            Some(Failure::Timeout) => Self::Timeout,
        }
    }
}
