// warp-coder-builtins/src/merge.rs
// ============================================================================
// Module: Merge Executor
// Description: Merges an issue's approved pull request.
// Purpose: Provide the shipped default implementation of `ActName::Merge`.
// Dependencies: warp_coder_adapters, warp_coder_core
// ============================================================================

//! ## Overview
//! Merge asks the code host to merge the issue's open pull request, then
//! confirms the merge landed by re-reading the pull request's state (§4.7).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use warp_coder_adapters::CodeHostAdapter;
use warp_coder_adapters::PrState;
use warp_coder_core::Context;
use warp_coder_core::ExecutorError;
use warp_coder_core::ExecutorResult;
use warp_coder_core::IssueRun;
use warp_coder_core::ResultType;
use warp_coder_core::WorkflowExecutor;

use crate::graph_document::MERGE;

// ============================================================================
// SECTION: Merge Executor
// ============================================================================

/// Merges an issue's approved pull request.
pub struct MergeExecutor {
    /// Declared result types, fixed at construction.
    result_types: BTreeSet<String>,
    /// The code-host adapter.
    code_host: Arc<dyn CodeHostAdapter>,
}

impl MergeExecutor {
    /// Builds a `Merge` executor over the given code-host adapter.
    #[must_use]
    pub fn new(code_host: Arc<dyn CodeHostAdapter>) -> Self {
        Self { result_types: BTreeSet::from(["merged".to_string(), "failed".to_string()]), code_host }
    }
}

#[async_trait]
impl WorkflowExecutor for MergeExecutor {
    fn name(&self) -> &str {
        MERGE
    }

    fn result_types(&self) -> &BTreeSet<String> {
        &self.result_types
    }

    async fn execute(&self, run: &IssueRun, _ctx: &Context) -> Result<ExecutorResult, ExecutorError> {
        let Ok(Some(pr_number)) = self.code_host.find_open_pr(&run.repo, run.issue_number).await else {
            let mut result = ExecutorResult::new(ResultType::Named("failed".to_string()));
            result.fields.insert("message".to_string(), Value::String("no open pull request".to_string()));
            return Ok(result);
        };

        if let Err(err) = self.code_host.merge_pr(&run.repo, pr_number).await {
            let mut result = ExecutorResult::new(ResultType::Named("failed".to_string()));
            result.fields.insert("message".to_string(), Value::String(err.to_string()));
            return Ok(result);
        }

        let merged = matches!(self.code_host.get_pr_state(&run.repo, pr_number).await, Ok(PrState::Merged));
        let result_type = if merged { "merged" } else { "failed" };
        let mut result = ExecutorResult::new(ResultType::Named(result_type.to_string()));
        result.fields.insert("prNumber".to_string(), Value::from(pr_number));
        Ok(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use expect/unwrap for failure messages")]
mod tests {
    use warp_coder_adapters::CodeHostError;
    use warp_coder_adapters::PrCommit;
    use warp_coder_adapters::PrFile;
    use warp_coder_adapters::ReviewSubmission;
    use warp_coder_core::IssueId;
    use warp_coder_core::IssueRunId;
    use warp_coder_core::ResultType;
    use warp_coder_core::Timestamp;
    use warp_coder_core::entities::OptsMap;

    use super::CodeHostAdapter;
    use super::Context;
    use super::IssueRun;
    use super::MergeExecutor;
    use super::PrState;
    use super::WorkflowExecutor;

    struct StubCodeHost {
        state_after_merge: PrState,
    }

    #[async_trait::async_trait]
    impl CodeHostAdapter for StubCodeHost {
        async fn find_open_pr(&self, _repo: &str, _issue_number: u64) -> Result<Option<u64>, CodeHostError> {
            Ok(Some(42))
        }
        async fn submit_review(&self, _repo: &str, _pr_number: u64, _submission: &ReviewSubmission) -> Result<(), CodeHostError> {
            Ok(())
        }
        async fn merge_pr(&self, _repo: &str, _pr_number: u64) -> Result<(), CodeHostError> {
            Ok(())
        }
        async fn get_pr_state(&self, _repo: &str, _pr_number: u64) -> Result<PrState, CodeHostError> {
            Ok(self.state_after_merge)
        }
        async fn get_pr_files(&self, _repo: &str, _pr_number: u64) -> Result<Vec<PrFile>, CodeHostError> {
            Ok(Vec::new())
        }
        async fn get_pr_commits(&self, _repo: &str, _pr_number: u64) -> Result<Vec<PrCommit>, CodeHostError> {
            Ok(Vec::new())
        }
        async fn get_pr_branch(&self, _repo: &str, _pr_number: u64) -> Result<String, CodeHostError> {
            Ok("feature/issue-1".to_string())
        }
        fn clear_cache(&self) {}
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
            groups: std::collections::BTreeMap::new(),
            board_item: None,
        }
    }

    #[tokio::test]
    async fn returns_merged_once_the_pr_state_confirms_it() {
        let executor = MergeExecutor::new(std::sync::Arc::new(StubCodeHost { state_after_merge: PrState::Merged }));
        let ctx = Context::new(None, OptsMap::new());
        let result = executor.execute(&sample_run(), &ctx).await.expect("executes");
        assert_eq!(result.result_type, ResultType::Named("merged".to_string()));
    }

    #[tokio::test]
    async fn returns_failed_if_the_pr_state_does_not_confirm_a_merge() {
        let executor = MergeExecutor::new(std::sync::Arc::new(StubCodeHost { state_after_merge: PrState::Open }));
        let ctx = Context::new(None, OptsMap::new());
        let result = executor.execute(&sample_run(), &ctx).await.expect("executes");
        assert_eq!(result.result_type, ResultType::Named("failed".to_string()));
    }
}
