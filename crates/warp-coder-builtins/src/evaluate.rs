// warp-coder-builtins/src/evaluate.rs
// ============================================================================
// Module: Evaluate Executor
// Description: Judges an issue's open pull request and decides whether it is
//              ready to merge.
// Purpose: Provide the shipped default implementation of `ActName::Evaluate`.
// Dependencies: warp_coder_adapters, warp_coder_core
// ============================================================================

//! ## Overview
//! Evaluate asks the coder to judge the pull request's current diff against
//! the issue it closes (§4.7). A one-shot turn keeps this bounded far
//! tighter than `Implement`'s full session. The coder's verdict is read from
//! a fixed keyword at the start of its result text: `APPROVE` yields
//! `approved`, `CHANGES_REQUESTED` yields `changes_requested`, and anything
//! else (including a turn that hit its budget) yields `waiting` so the next
//! poll tries again.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use warp_coder_adapters::CodeHostAdapter;
use warp_coder_adapters::CoderClient;
use warp_coder_adapters::RunOptions;
use warp_coder_adapters::coder::trace_from_envelope;
use warp_coder_core::Context;
use warp_coder_core::ExecutorError;
use warp_coder_core::ExecutorResult;
use warp_coder_core::IssueRun;
use warp_coder_core::ResultType;
use warp_coder_core::WorkflowExecutor;

use crate::graph_document::EVALUATE;

/// Keyword the judging prompt instructs the coder to open its verdict with.
const APPROVE_KEYWORD: &str = "APPROVE";
/// Keyword the judging prompt instructs the coder to open its verdict with.
const CHANGES_REQUESTED_KEYWORD: &str = "CHANGES_REQUESTED";

// ============================================================================
// SECTION: Evaluate Executor
// ============================================================================

/// Judges an issue's open pull request with a bounded coder turn.
pub struct EvaluateExecutor {
    /// Declared result types, fixed at construction.
    result_types: BTreeSet<String>,
    /// The coder subprocess client.
    coder: Arc<dyn CoderClient>,
    /// The code-host adapter, used to fetch the diff under judgment.
    code_host: Arc<dyn CodeHostAdapter>,
}

impl EvaluateExecutor {
    /// Builds an `Evaluate` executor over the given adapters.
    #[must_use]
    pub fn new(coder: Arc<dyn CoderClient>, code_host: Arc<dyn CodeHostAdapter>) -> Self {
        Self {
            result_types: BTreeSet::from([
                "waiting".to_string(),
                "approved".to_string(),
                "changes_requested".to_string(),
            ]),
            coder,
            code_host,
        }
    }
}

#[async_trait]
impl WorkflowExecutor for EvaluateExecutor {
    fn name(&self) -> &str {
        EVALUATE
    }

    fn result_types(&self) -> &BTreeSet<String> {
        &self.result_types
    }

    async fn execute(&self, run: &IssueRun, _ctx: &Context) -> Result<ExecutorResult, ExecutorError> {
        let Ok(Some(pr_number)) = self.code_host.find_open_pr(&run.repo, run.issue_number).await else {
            return Ok(ExecutorResult::waiting());
        };
        let files = self.code_host.get_pr_files(&run.repo, pr_number).await.unwrap_or_default();
        let changed = files.iter().map(|file| file.path.clone()).collect::<Vec<_>>().join(", ");

        let prompt = format!(
            "Judge whether pull request #{pr_number} for issue #{}, \"{}\", fully resolves the issue. \
             Changed files: {changed}. Reply starting with {APPROVE_KEYWORD} or {CHANGES_REQUESTED_KEYWORD}.",
            run.issue_number, run.title
        );
        let options = RunOptions { max_turns: Some(1), allowed_tools: None, disallowed_tools: Vec::new(), working_dir: ".".to_string() };

        let envelope = match self.coder.one_shot(&prompt, &options).await {
            Ok(envelope) => envelope,
            Err(_) => return Ok(ExecutorResult::waiting()),
        };

        let verdict = envelope.result_text.trim_start();
        let mut result = if verdict.starts_with(APPROVE_KEYWORD) {
            ExecutorResult::new(ResultType::Named("approved".to_string()))
        } else if verdict.starts_with(CHANGES_REQUESTED_KEYWORD) {
            ExecutorResult::new(ResultType::Named("changes_requested".to_string()))
        } else {
            ExecutorResult::waiting()
        };
        result.fields.insert("prNumber".to_string(), Value::from(pr_number));
        result.cost_usd = envelope.cost_usd;
        result.trace = Some(trace_from_envelope(&envelope));
        Ok(result)
    }
}
