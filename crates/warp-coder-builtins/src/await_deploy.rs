// warp-coder-builtins/src/await_deploy.rs
// ============================================================================
// Module: Await Deploy Executor
// Description: Waits for the deploy context provider to resolve a non-empty
//              deploy batch for this run.
// Purpose: Provide the shipped default implementation of
//          `ActName::AwaitDeploy`.
// Dependencies: warp_coder_core
// ============================================================================

//! ## Overview
//! AwaitDeploy never calls an adapter directly: the scheduler invokes the
//! registered `deploy` context provider ahead of every call and hands this
//! executor the result through [`Context::extra_context`] (§4.6 step 3,
//! §4.7). Once `deployBatch` is present and non-empty the executor returns
//! `ready`, forwarding the batch onto `RunDeploy`'s act options; otherwise it
//! returns `waiting`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde_json::Value;
use warp_coder_core::Context;
use warp_coder_core::ExecutorError;
use warp_coder_core::ExecutorResult;
use warp_coder_core::IssueRun;
use warp_coder_core::ResultType;
use warp_coder_core::WorkflowExecutor;
use warp_coder_core::entities::OptsMap;

use crate::graph_document::AWAIT_DEPLOY;

/// Extra-context key the deploy provider publishes the batch under.
const DEPLOY_BATCH_FIELD: &str = "deployBatch";

// ============================================================================
// SECTION: Await Deploy Executor
// ============================================================================

/// Waits for a non-empty deploy batch to be resolved for this run.
pub struct AwaitDeployExecutor {
    /// Declared result types, fixed at construction.
    result_types: BTreeSet<String>,
}

impl AwaitDeployExecutor {
    /// Builds an `AwaitDeploy` executor.
    #[must_use]
    pub fn new() -> Self {
        Self { result_types: BTreeSet::from(["waiting".to_string(), "ready".to_string()]) }
    }
}

impl Default for AwaitDeployExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkflowExecutor for AwaitDeployExecutor {
    fn name(&self) -> &str {
        AWAIT_DEPLOY
    }

    fn result_types(&self) -> &BTreeSet<String> {
        &self.result_types
    }

    async fn execute(&self, _run: &IssueRun, ctx: &Context) -> Result<ExecutorResult, ExecutorError> {
        let batch = ctx.extra_context.get(DEPLOY_BATCH_FIELD).and_then(Value::as_array);
        let Some(batch) = batch.filter(|batch| !batch.is_empty()) else {
            return Ok(ExecutorResult::waiting());
        };

        let mut result = ExecutorResult::new(ResultType::Named("ready".to_string()));
        let mut next_act_opts = OptsMap::new();
        next_act_opts.insert(DEPLOY_BATCH_FIELD.to_string(), Value::Array(batch.clone()));
        result.next_act_opts = Some(next_act_opts);
        Ok(result)
    }
}
