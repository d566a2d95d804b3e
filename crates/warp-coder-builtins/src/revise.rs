// warp-coder-builtins/src/revise.rs
// ============================================================================
// Module: Revise Executor
// Description: Drives the coder to address review feedback, bounded by a
//              maximum revision count.
// Purpose: Provide the shipped default implementation of `ActName::Revise`.
// Dependencies: warp_coder_adapters, warp_coder_core
// ============================================================================

//! ## Overview
//! Revise tracks how many times an issue has looped back from Evaluate via
//! the `revisionCount` field carried on the pending act's options. Once the
//! count reaches [`RevisionExecutor::max_revisions`] it returns
//! `max_retries` instead of attempting another pass (§9 invariant: bounded
//! revision loops).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use warp_coder_adapters::CoderClient;
use warp_coder_adapters::CoderEvent;
use warp_coder_adapters::GitClient;
use warp_coder_adapters::RunOptions;
use warp_coder_adapters::coder::trace_from_envelope;
use warp_coder_core::Context;
use warp_coder_core::ExecutorError;
use warp_coder_core::ExecutorResult;
use warp_coder_core::IssueRun;
use warp_coder_core::ResultType;
use warp_coder_core::WorkflowExecutor;
use warp_coder_core::entities::OptsMap;

use crate::graph_document::REVISE;

/// Field name the revision loop's counter is carried on, in act options.
const REVISION_COUNT_FIELD: &str = "revisionCount";
/// Default cap on revision loops before giving up (documented default).
const DEFAULT_MAX_REVISIONS: u64 = 3;

// ============================================================================
// SECTION: Revise Executor
// ============================================================================

/// Drives a coder turn to address review feedback, bounded by a revision cap.
pub struct RevisionExecutor {
    /// Declared result types, fixed at construction.
    result_types: BTreeSet<String>,
    /// The coder subprocess client.
    coder: Arc<dyn CoderClient>,
    /// The git client used to commit and push the revision.
    git: Arc<dyn GitClient>,
    /// Maximum number of revision loops before `max_retries` is returned.
    max_revisions: u64,
}

impl RevisionExecutor {
    /// Builds a `Revise` executor with the documented default revision cap.
    #[must_use]
    pub fn new(coder: Arc<dyn CoderClient>, git: Arc<dyn GitClient>) -> Self {
        Self::with_max_revisions(coder, git, DEFAULT_MAX_REVISIONS)
    }

    /// Builds a `Revise` executor with an explicit revision cap.
    #[must_use]
    pub fn with_max_revisions(coder: Arc<dyn CoderClient>, git: Arc<dyn GitClient>, max_revisions: u64) -> Self {
        Self {
            result_types: BTreeSet::from(["fixed".to_string(), "max_retries".to_string()]),
            coder,
            git,
            max_revisions,
        }
    }

    /// Returns the configured revision cap.
    #[must_use]
    pub fn max_revisions(&self) -> u64 {
        self.max_revisions
    }
}

#[async_trait]
impl WorkflowExecutor for RevisionExecutor {
    fn name(&self) -> &str {
        REVISE
    }

    fn result_types(&self) -> &BTreeSet<String> {
        &self.result_types
    }

    async fn execute(&self, run: &IssueRun, ctx: &Context) -> Result<ExecutorResult, ExecutorError> {
        let previous_count = ctx.act_opts.get(REVISION_COUNT_FIELD).and_then(Value::as_u64).unwrap_or(0);

        if previous_count >= self.max_revisions {
            let mut result = ExecutorResult::new(ResultType::Named("max_retries".to_string()));
            result.fields.insert(REVISION_COUNT_FIELD.to_string(), Value::from(previous_count));
            return Ok(result);
        }

        let next_count = previous_count + 1;
        let prompt = format!("Address the requested changes on issue #{}: {}", run.issue_number, run.title);
        let options = RunOptions {
            max_turns: None,
            allowed_tools: None,
            disallowed_tools: Vec::new(),
            working_dir: format!("./workspaces/{}", run.repo.replace('/', "-")),
        };

        let mut on_event = |_event: CoderEvent| {};
        let envelope = self.coder.run(&prompt, &options, &mut on_event).await;
        let envelope = match envelope {
            Ok(envelope) => envelope,
            Err(err) => {
                let mut result = ExecutorResult::new(ResultType::Named("max_retries".to_string()));
                result.fields.insert("message".to_string(), Value::String(err.to_string()));
                return Ok(result);
            }
        };

        let status = self.git.status().await.unwrap_or_default();
        if !status.clean {
            let _ = self.git.add_all_commit_all("Address review feedback").await;
            let branch = self.git.current_branch().await.unwrap_or_default();
            let _ = self.git.push_force_with_lease("origin", &branch).await;
        }

        let mut result = ExecutorResult::new(ResultType::Named("fixed".to_string()));
        result.fields.insert(REVISION_COUNT_FIELD.to_string(), Value::from(next_count));
        let mut next_act_opts = OptsMap::new();
        next_act_opts.insert(REVISION_COUNT_FIELD.to_string(), Value::from(next_count));
        result.next_act_opts = Some(next_act_opts);
        result.cost_usd = envelope.cost_usd;
        result.trace = Some(trace_from_envelope(&envelope));
        Ok(result)
    }
}
