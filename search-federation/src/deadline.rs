//! Nested deadlines: an absolute expiry instant paired with a cancellation
//! token.
//!
//! A [`Deadline`] is what the orchestrator hands to each provider task. A
//! child deadline never outlives its parent: its instant is clamped to the
//! parent's, and its token is a child of the parent's token, so cancelling
//! the parent cancels every descendant.

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Budget used when a requested duration would overflow the clock.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// An absolute deadline with cooperative cancellation.
#[derive(Debug, Clone)]
pub struct Deadline {
    at: Instant,
    token: CancellationToken,
}

impl Deadline {
    /// A deadline `budget` from now, cancelled through `token`.
    pub fn after(budget: Duration, token: CancellationToken) -> Self {
        Self {
            at: instant_after(Instant::now(), budget),
            token,
        }
    }

    /// A deadline at a fixed instant.
    pub fn at(at: Instant, token: CancellationToken) -> Self {
        Self { at, token }
    }

    /// Derive a nested deadline: `min(budget from now, remaining parent budget)`.
    ///
    /// The child gets its own token so it can be cancelled independently,
    /// but cancelling `self` still cancels the child.
    pub fn child(&self, budget: Duration) -> Self {
        Self {
            at: instant_after(Instant::now(), budget).min(self.at),
            token: self.token.child_token(),
        }
    }

    /// The expiry instant.
    pub fn instant(&self) -> Instant {
        self.at
    }

    /// Time left before expiry, zero once elapsed.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// Whether the expiry instant has passed.
    pub fn is_elapsed(&self) -> bool {
        Instant::now() >= self.at
    }

    /// Whether this deadline (or an ancestor) was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel this deadline and all of its children.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// The underlying cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Resolves when the deadline passes or the token is cancelled.
    pub async fn expired(&self) {
        tokio::select! {
            () = tokio::time::sleep_until(self.at) => {}
            () = self.token.cancelled() => {}
        }
    }
}

fn instant_after(now: Instant, budget: Duration) -> Instant {
    now.checked_add(budget)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}
