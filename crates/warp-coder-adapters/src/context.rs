// warp-coder-adapters/src/context.rs
// ============================================================================
// Module: Context Providers
// Description: A name-keyed registry of functions supplying extra context
//              computed before an executor is invoked.
// Purpose: Let the scheduler inject pre-computed context (e.g. the deploy
//          batch) without executors depending on each other.
// Dependencies: async_trait, thiserror, warp_coder_core
// ============================================================================

//! ## Overview
//! The scheduler runs a run's registered context provider, keyed by the
//! about-to-be-invoked executor's name, before calling the executor
//! (§4.6 step 3). The canonical provider is `deploy`, which injects
//! `{deployBatch}` computed by a pure fixed-point helper elsewhere in the
//! workspace; this crate defines only the provider contract (§4.7).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use warp_coder_core::IssueRun;
use warp_coder_core::entities::OptsMap;

// ============================================================================
// SECTION: Context Provider
// ============================================================================

/// Context provider failures.
#[derive(Debug, Error)]
pub enum ContextProviderError {
    /// The provider could not compute extra context for this run.
    #[error("context provider failed: {0}")]
    Failed(String),
}

/// A function that computes extra context for a run, keyed by executor name.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    /// Computes the extra context map to merge into the executor's
    /// [`warp_coder_core::Context::extra_context`] before invocation.
    ///
    /// # Errors
    ///
    /// Returns [`ContextProviderError`] when context cannot be computed.
    async fn provide(&self, run: &IssueRun) -> Result<OptsMap, ContextProviderError>;
}

/// A name-keyed registry of context providers.
pub struct ContextProviderRegistry {
    /// Registered providers, keyed by executor name.
    providers: BTreeMap<String, Arc<dyn ContextProvider>>,
}

impl Default for ContextProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ContextProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextProviderRegistry")
            .field("registered", &self.providers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ContextProviderRegistry {
    /// Builds an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { providers: BTreeMap::new() }
    }

    /// Registers a provider under an executor name, replacing any existing
    /// registration for that name.
    pub fn register(&mut self, executor_name: impl Into<String>, provider: Arc<dyn ContextProvider>) {
        self.providers.insert(executor_name.into(), provider);
    }

    /// Looks up the provider registered for an executor name, if any.
    #[must_use]
    pub fn get(&self, executor_name: &str) -> Option<&Arc<dyn ContextProvider>> {
        self.providers.get(executor_name)
    }

    /// Computes extra context for a run if a provider is registered for its
    /// about-to-be-invoked executor; returns an empty map otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ContextProviderError`] when a registered provider fails.
    pub async fn invoke(&self, executor_name: &str, run: &IssueRun) -> Result<OptsMap, ContextProviderError> {
        match self.get(executor_name) {
            Some(provider) => provider.provide(run).await,
            None => Ok(OptsMap::new()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use expect/unwrap for failure messages")]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use warp_coder_core::IssueId;
    use warp_coder_core::IssueRun;
    use warp_coder_core::IssueRunId;
    use warp_coder_core::Timestamp;
    use warp_coder_core::entities::OptsMap;

    use super::ContextProvider;
    use super::ContextProviderError;
    use super::ContextProviderRegistry;

    struct StubProvider;

    #[async_trait]
    impl ContextProvider for StubProvider {
        async fn provide(&self, _run: &IssueRun) -> Result<OptsMap, ContextProviderError> {
            let mut opts = OptsMap::new();
            opts.insert("deployBatch".to_string(), serde_json::Value::Array(vec![]));
            Ok(opts)
        }
    }

    fn sample_run() -> IssueRun {
        IssueRun {
            id: IssueRunId::generate(Timestamp::from_unix_millis(0)),
            issue_id: IssueId::new("issue-1"),
            issue_number: 1,
            repo: "acme/widgets".to_string(),
            title: "Fix the widget".to_string(),
            latest_outcome: None,
            pending_act: None,
            groups: BTreeMap::new(),
            board_item: None,
        }
    }

    #[tokio::test]
    async fn unregistered_executor_yields_empty_context() {
        let registry = ContextProviderRegistry::new();
        let context = registry.invoke("Build", &sample_run()).await.expect("empty context");
        assert!(context.is_empty());
    }

    #[tokio::test]
    async fn registered_provider_supplies_deploy_batch() {
        let mut registry = ContextProviderRegistry::new();
        registry.register("Deploy", Arc::new(StubProvider));
        let context = registry.invoke("Deploy", &sample_run()).await.expect("deploy context");
        assert!(context.contains_key("deployBatch"));
    }
}
