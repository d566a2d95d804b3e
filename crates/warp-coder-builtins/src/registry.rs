// warp-coder-builtins/src/registry.rs
// ============================================================================
// Module: Default Registry
// Description: Assembles the shipped default executors and context
//              providers over a caller-supplied set of adapters.
// Purpose: Give the daemon a one-call way to wire up the default workflow's
//          executor and context-provider registries.
// Dependencies: warp_coder_adapters, warp_coder_core, warp_coder_ledger
// ============================================================================

//! ## Overview
//! The daemon constructs one concrete implementation per adapter trait
//! (§4.7) and hands them here; [`default_registry`] wires them onto the
//! nine shipped work-act executors, and [`default_context_providers`] wires
//! the deploy batch provider onto `AwaitDeploy` (§4.6 step 3).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use warp_coder_adapters::CodeHostAdapter;
use warp_coder_adapters::CoderClient;
use warp_coder_adapters::ContextProviderRegistry;
use warp_coder_adapters::GitClient;
use warp_coder_adapters::IssuesClient;
use warp_coder_adapters::NotifyClient;
use warp_coder_core::ExecutorRegistry;
use warp_coder_ledger::LedgerClient;

use crate::await_deploy::AwaitDeployExecutor;
use crate::await_reply::AwaitReplyExecutor;
use crate::deploy_provider::DeployContextProvider;
use crate::evaluate::EvaluateExecutor;
use crate::graph_document::AWAIT_DEPLOY;
use crate::implement::ImplementExecutor;
use crate::merge::MergeExecutor;
use crate::publish::PublishExecutor;
use crate::review::ReviewExecutor;
use crate::revise::RevisionExecutor;
use crate::run_deploy::RunDeployExecutor;

// ============================================================================
// SECTION: Adapter Bundle
// ============================================================================

/// The concrete adapters the shipped default executors are built over.
///
/// Every field is a trait object so the daemon may supply whichever
/// concrete code-host, issue-tracker, or coder integration it is
/// configured with; this crate never names one.
#[derive(Clone)]
pub struct BuiltinAdapters {
    /// The coder subprocess client.
    pub coder: Arc<dyn CoderClient>,
    /// The code-host (pull request) adapter.
    pub code_host: Arc<dyn CodeHostAdapter>,
    /// The issue tracker client.
    pub issues: Arc<dyn IssuesClient>,
    /// The git working-tree client.
    pub git: Arc<dyn GitClient>,
    /// The notify client.
    pub notify: Arc<dyn NotifyClient>,
}

// ============================================================================
// SECTION: Default Registry
// ============================================================================

/// Builds the executor registry backing the shipped default workflow graph.
#[must_use]
pub fn default_registry(adapters: &BuiltinAdapters) -> ExecutorRegistry {
    let mut registry = ExecutorRegistry::new();
    registry.register(Arc::new(ImplementExecutor::new(Arc::clone(&adapters.coder), Arc::clone(&adapters.code_host))));
    registry.register(Arc::new(AwaitReplyExecutor::new(Arc::clone(&adapters.issues))));
    registry.register(Arc::new(ReviewExecutor::new(Arc::clone(&adapters.code_host))));
    registry.register(Arc::new(EvaluateExecutor::new(Arc::clone(&adapters.coder), Arc::clone(&adapters.code_host))));
    registry.register(Arc::new(RevisionExecutor::new(Arc::clone(&adapters.coder), Arc::clone(&adapters.git))));
    registry.register(Arc::new(MergeExecutor::new(Arc::clone(&adapters.code_host))));
    registry.register(Arc::new(AwaitDeployExecutor::new()));
    registry.register(Arc::new(RunDeployExecutor::new(Arc::clone(&adapters.coder))));
    registry.register(Arc::new(PublishExecutor::new(Arc::clone(&adapters.notify))));
    registry
}

/// Builds the context-provider registry backing the shipped default
/// workflow graph: the `deploy` batch provider, keyed to `AwaitDeploy`.
#[must_use]
pub fn default_context_providers(ledger: Arc<LedgerClient>) -> ContextProviderRegistry {
    let mut registry = ContextProviderRegistry::new();
    registry.register(AWAIT_DEPLOY, Arc::new(DeployContextProvider::new(ledger)));
    registry
}
