//! Registry mapping provider ids to provider instances.
//!
//! Built once at process start and shared by reference with the
//! orchestrator. There is no ambient global registry.

use crate::error::FederationError;
use crate::provider::SearchProvider;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Provider id → capability instance.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn SearchProvider>>,
}

impl ProviderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` under its own [`name`](SearchProvider::name).
    ///
    /// Returns the previously registered provider with that id, if any.
    pub fn register<P>(&mut self, provider: P) -> Option<Arc<dyn SearchProvider>>
    where
        P: SearchProvider + 'static,
    {
        self.register_arc(Arc::new(provider))
    }

    /// Register an already shared provider.
    pub fn register_arc(&mut self, provider: Arc<dyn SearchProvider>) -> Option<Arc<dyn SearchProvider>> {
        let id = provider.name().to_owned();
        self.providers.insert(id, provider)
    }

    /// Look up a provider by id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn SearchProvider>> {
        self.providers.get(id).cloned()
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.providers.contains_key(id)
    }

    /// Registered ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.providers.keys().map(String::as_str)
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no provider is registered.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Reject the first id in `requested` that is not registered.
    ///
    /// Used at the request boundary, before anything is dispatched.
    pub fn check_known<'a, I>(&self, requested: I) -> Result<(), FederationError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        match requested.into_iter().find(|id| !self.contains(id)) {
            Some(unknown) => Err(FederationError::UnknownProvider {
                provider: unknown.to_owned(),
                valid: self.ids().collect::<Vec<_>>().join(", "),
            }),
            None => Ok(()),
        }
    }

    /// Resolve the effective dispatch set for a query.
    ///
    /// An empty `requested` set selects every registered provider. Requested
    /// ids missing from the registry are skipped with a warning.
    pub fn resolve(&self, requested: &BTreeSet<String>) -> Vec<(String, Arc<dyn SearchProvider>)> {
        if requested.is_empty() {
            return self
                .providers
                .iter()
                .map(|(id, provider)| (id.clone(), Arc::clone(provider)))
                .collect();
        }

        requested
            .iter()
            .filter_map(|id| match self.providers.get(id) {
                Some(provider) => Some((id.clone(), Arc::clone(provider))),
                None => {
                    tracing::warn!(provider = %id, "unknown provider requested, skipping");
                    None
                }
            })
            .collect()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.ids().collect::<Vec<_>>())
            .finish()
    }
}
