//! Federation configuration with sensible defaults.
//!
//! [`FederationConfig`] holds the two time budgets and the default result
//! cap. Sourcing (files, environment) belongs to the caller; this type only
//! carries and validates the values.

use crate::error::FederationError;
use crate::types::MAX_RESULT_CAP;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Time budgets and defaults for a federated search.
///
/// Use [`Default::default()`] for the stock values, or construct with
/// field overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FederationConfig {
    /// Budget for the whole fan-out, in milliseconds.
    pub global_timeout_ms: u64,
    /// Budget for each provider task, in milliseconds. Clamped to whatever
    /// is left of the global budget when the task starts.
    pub per_provider_timeout_ms: u64,
    /// Result cap used when a query asks for 0 (or an out-of-range value).
    pub default_result_cap: u32,
}

impl Default for FederationConfig {
    fn default() -> Self {
        Self {
            global_timeout_ms: 500,
            per_provider_timeout_ms: 400,
            default_result_cap: 20,
        }
    }
}

impl FederationConfig {
    /// Global budget as a [`Duration`].
    pub fn global_timeout(&self) -> Duration {
        Duration::from_millis(self.global_timeout_ms)
    }

    /// Per-provider budget as a [`Duration`].
    pub fn per_provider_timeout(&self) -> Duration {
        Duration::from_millis(self.per_provider_timeout_ms)
    }

    /// The cap actually sent to providers for a requested cap.
    ///
    /// Values in `1..=100` are used as-is; anything else falls back to
    /// [`default_result_cap`](Self::default_result_cap).
    pub fn effective_result_cap(&self, requested: u32) -> usize {
        if (1..=MAX_RESULT_CAP).contains(&requested) {
            requested as usize
        } else {
            self.default_result_cap as usize
        }
    }

    /// Validates this configuration.
    ///
    /// Checks:
    /// - both timeouts must be greater than 0
    /// - `default_result_cap` must be in `1..=100`
    ///
    /// A per-provider timeout above the global one is allowed but logged:
    /// tasks are still cut off by the global budget.
    pub fn validate(&self) -> Result<(), FederationError> {
        if self.global_timeout_ms == 0 {
            return Err(FederationError::Config(
                "global_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.per_provider_timeout_ms == 0 {
            return Err(FederationError::Config(
                "per_provider_timeout_ms must be greater than 0".into(),
            ));
        }
        if !(1..=MAX_RESULT_CAP).contains(&self.default_result_cap) {
            return Err(FederationError::Config(format!(
                "default_result_cap must be between 1 and {MAX_RESULT_CAP}"
            )));
        }
        if self.per_provider_timeout_ms > self.global_timeout_ms {
            tracing::warn!(
                per_provider_timeout_ms = self.per_provider_timeout_ms,
                global_timeout_ms = self.global_timeout_ms,
                "per-provider timeout exceeds global timeout; global budget wins"
            );
        }
        Ok(())
    }
}
