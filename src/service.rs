//! Request handling independent of the transport.
//!
//! [`SearchService`] validates a wire request, runs the federated search
//! under a deadline tied to the server's shutdown token, and maps the result
//! back to wire types.

use crate::api::{HealthReply, SearchReply, SearchRequest};
use search_federation::{Deadline, FederationError, Orchestrator};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio_util::sync::CancellationToken;

/// Search request handler shared by all connections.
#[derive(Clone)]
pub struct SearchService {
    orchestrator: Arc<Orchestrator>,
    shutdown: CancellationToken,
}

impl SearchService {
    /// Create a service over `orchestrator`. Cancelling `shutdown` cancels
    /// every in-flight search.
    pub fn new(orchestrator: Arc<Orchestrator>, shutdown: CancellationToken) -> Self {
        Self { orchestrator, shutdown }
    }

    /// The underlying orchestrator.
    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    /// Validate and run one search.
    ///
    /// # Errors
    ///
    /// Returns a client error from validation (no provider is contacted),
    /// or an internal error if the orchestrator cannot run at all.
    pub async fn search(&self, request: SearchRequest) -> Result<SearchReply, FederationError> {
        let query = request.validate(self.orchestrator.registry())?;

        tracing::trace!(
            query = query.text(),
            max_results = request.max_results,
            platforms = ?request.platforms,
            "search request received"
        );

        let deadline = Deadline::after(
            self.orchestrator.config().global_timeout(),
            self.shutdown.child_token(),
        );
        let response = self.orchestrator.run(&deadline, &query).await?;

        tracing::debug!(
            total = response.total_count(),
            queried = response.providers_queried,
            "search request served"
        );
        Ok(SearchReply::from(response))
    }

    /// Liveness report.
    pub fn health(&self) -> HealthReply {
        HealthReply {
            status: "healthy".to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            timestamp: unix_timestamp(),
        }
    }
}

/// Get the current Unix timestamp in seconds.
fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
