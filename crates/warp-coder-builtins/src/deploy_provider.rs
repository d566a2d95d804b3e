// warp-coder-builtins/src/deploy_provider.rs
// ============================================================================
// Module: Deploy Context Provider
// Description: The canonical context provider injecting `{deployBatch}`
//              ahead of an `AwaitDeploy` invocation.
// Purpose: Wire `compute_deploy_batch` to the `ContextProvider` contract.
// Dependencies: warp_coder_adapters, warp_coder_core, warp_coder_ledger
// ============================================================================

//! ## Overview
//! Before every `AwaitDeploy` invocation the scheduler asks this provider for
//! extra context (§4.6 step 3, §4.7). It re-reads the ledger's open-run
//! index, narrows it to runs also waiting on deploy, and computes the
//! deploy batch rooted at the run currently being invoked. The `deployBatch`
//! list is a snapshot: a concurrent run leaving or entering the candidate
//! set between this call and `RunDeploy`'s own invocation is expected and
//! re-resolved on the next poll.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use warp_coder_adapters::ContextProvider;
use warp_coder_adapters::ContextProviderError;
use warp_coder_core::IssueRun;
use warp_coder_core::entities::OptsMap;
use warp_coder_ledger::LedgerClient;

use crate::deploy_batch::DeployCandidate;
use crate::deploy_batch::compute_deploy_batch;

/// Pending-act label marking a run as waiting on deploy.
const AWAIT_DEPLOY_ACT_LABEL: &str = "Await Deploy";

// ============================================================================
// SECTION: Deploy Context Provider
// ============================================================================

/// Computes `{deployBatch}` for an `AwaitDeploy` invocation.
pub struct DeployContextProvider {
    /// Ledger client used to discover deploy-waiting sibling runs.
    ledger: Arc<LedgerClient>,
}

impl DeployContextProvider {
    /// Builds a deploy context provider over the given ledger client.
    #[must_use]
    pub fn new(ledger: Arc<LedgerClient>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl ContextProvider for DeployContextProvider {
    async fn provide(&self, run: &IssueRun) -> Result<OptsMap, ContextProviderError> {
        let open_runs = self
            .ledger
            .find_open_issue_runs()
            .map_err(|err| ContextProviderError::Failed(err.to_string()))?;

        let candidates = open_runs
            .into_iter()
            .filter(|open_run| {
                open_run.pending_act.as_ref().is_some_and(|act| act.name == AWAIT_DEPLOY_ACT_LABEL)
            })
            .map(|open_run| DeployCandidate { run_id: open_run.id, repos: BTreeSet::from([open_run.repo]) })
            .collect::<Vec<_>>();

        let batch = compute_deploy_batch(&run.id, &candidates);

        let mut context = OptsMap::new();
        context.insert(
            "deployBatch".to_string(),
            Value::Array(batch.into_iter().map(|run_id| Value::String(run_id.to_string())).collect()),
        );
        Ok(context)
    }
}
