// warp-coder-builtins/src/run_deploy.rs
// ============================================================================
// Module: Run Deploy Executor
// Description: Drives the coder through the deploy batch forwarded by
//              `AwaitDeploy`.
// Purpose: Provide the shipped default implementation of `ActName::RunDeploy`.
// Dependencies: warp_coder_adapters, warp_coder_core
// ============================================================================

//! ## Overview
//! RunDeploy reads the `deployBatch` forwarded on the pending act's options
//! (§4.7) and drives one coder turn over the whole batch rather than one
//! per sibling run, since the batch shares at least one repository by
//! construction ([`crate::deploy_batch::compute_deploy_batch`]).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use warp_coder_adapters::CoderClient;
use warp_coder_adapters::RunOptions;
use warp_coder_adapters::coder::trace_from_envelope;
use warp_coder_core::Context;
use warp_coder_core::ExecutorError;
use warp_coder_core::ExecutorResult;
use warp_coder_core::IssueRun;
use warp_coder_core::ResultType;
use warp_coder_core::WorkflowExecutor;

use crate::graph_document::RUN_DEPLOY;

/// Field the pending act's options carry the forwarded deploy batch on.
const DEPLOY_BATCH_FIELD: &str = "deployBatch";

// ============================================================================
// SECTION: Run Deploy Executor
// ============================================================================

/// Drives deployment for the batch of runs resolved by `AwaitDeploy`.
pub struct RunDeployExecutor {
    /// Declared result types, fixed at construction.
    result_types: BTreeSet<String>,
    /// The coder subprocess client.
    coder: Arc<dyn CoderClient>,
}

impl RunDeployExecutor {
    /// Builds a `RunDeploy` executor over the given coder client.
    #[must_use]
    pub fn new(coder: Arc<dyn CoderClient>) -> Self {
        Self { result_types: BTreeSet::from(["deployed".to_string(), "failed".to_string()]), coder }
    }
}

#[async_trait]
impl WorkflowExecutor for RunDeployExecutor {
    fn name(&self) -> &str {
        RUN_DEPLOY
    }

    fn result_types(&self) -> &BTreeSet<String> {
        &self.result_types
    }

    async fn execute(&self, run: &IssueRun, ctx: &Context) -> Result<ExecutorResult, ExecutorError> {
        let batch_size = ctx.act_opts.get(DEPLOY_BATCH_FIELD).and_then(Value::as_array).map_or(1, Vec::len);

        let prompt = format!(
            "Run the deploy pipeline for repository {} (issue #{}), covering {batch_size} batched run(s).",
            run.repo, run.issue_number
        );
        let options = RunOptions { max_turns: None, allowed_tools: None, disallowed_tools: Vec::new(), working_dir: ".".to_string() };

        let envelope = match self.coder.one_shot(&prompt, &options).await {
            Ok(envelope) => envelope,
            Err(err) => {
                let mut result = ExecutorResult::new(ResultType::Named("failed".to_string()));
                result.fields.insert("message".to_string(), Value::String(err.to_string()));
                return Ok(result);
            }
        };

        let mut result = ExecutorResult::new(ResultType::Named("deployed".to_string()));
        result.fields.insert("batchSize".to_string(), Value::from(batch_size));
        result.cost_usd = envelope.cost_usd;
        result.trace = Some(trace_from_envelope(&envelope));
        Ok(result)
    }
}
