// warp-coder-builtins/src/review.rs
// ============================================================================
// Module: Review Executor
// Description: Requests review on an issue's open pull request.
// Purpose: Provide the shipped default implementation of `ActName::Review`.
// Dependencies: warp_coder_adapters, warp_coder_core
// ============================================================================

//! ## Overview
//! Review has exactly one declared result type (§4.7): it posts a
//! review-request comment against the issue's open pull request and always
//! returns `requested`, whether or not a pull request could be found. Unlike
//! `Evaluate`, it never judges the pull request's content.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use warp_coder_adapters::CodeHostAdapter;
use warp_coder_adapters::ReviewEvent;
use warp_coder_adapters::ReviewSubmission;
use warp_coder_core::Context;
use warp_coder_core::ExecutorError;
use warp_coder_core::ExecutorResult;
use warp_coder_core::IssueRun;
use warp_coder_core::ResultType;
use warp_coder_core::WorkflowExecutor;

use crate::graph_document::REVIEW;

// ============================================================================
// SECTION: Review Executor
// ============================================================================

/// Requests review on an issue's open pull request.
pub struct ReviewExecutor {
    /// Declared result types, fixed at construction.
    result_types: BTreeSet<String>,
    /// The code-host adapter.
    code_host: Arc<dyn CodeHostAdapter>,
}

impl ReviewExecutor {
    /// Builds a `Review` executor over the given code-host adapter.
    #[must_use]
    pub fn new(code_host: Arc<dyn CodeHostAdapter>) -> Self {
        Self { result_types: BTreeSet::from(["requested".to_string()]), code_host }
    }
}

#[async_trait]
impl WorkflowExecutor for ReviewExecutor {
    fn name(&self) -> &str {
        REVIEW
    }

    fn result_types(&self) -> &BTreeSet<String> {
        &self.result_types
    }

    async fn execute(&self, run: &IssueRun, _ctx: &Context) -> Result<ExecutorResult, ExecutorError> {
        let mut result = ExecutorResult::new(ResultType::Named("requested".to_string()));

        let Ok(Some(pr_number)) = self.code_host.find_open_pr(&run.repo, run.issue_number).await else {
            result.fields.insert("requested".to_string(), Value::Bool(false));
            return Ok(result);
        };

        let submission = ReviewSubmission {
            event: ReviewEvent::Comment,
            body: "Ready for review.".to_string(),
            comments: Vec::new(),
        };
        let posted = self.code_host.submit_review(&run.repo, pr_number, &submission).await.is_ok();
        result.fields.insert("prNumber".to_string(), Value::from(pr_number));
        result.fields.insert("requested".to_string(), Value::Bool(posted));
        Ok(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use expect/unwrap for failure messages")]
mod tests {
    use warp_coder_adapters::CodeHostError;
    use warp_coder_adapters::PrCommit;
    use warp_coder_adapters::PrFile;
    use warp_coder_adapters::PrState;
    use warp_coder_core::IssueId;
    use warp_coder_core::IssueRunId;
    use warp_coder_core::ResultType;
    use warp_coder_core::Timestamp;
    use warp_coder_core::entities::OptsMap;

    use super::CodeHostAdapter;
    use super::Context;
    use super::IssueRun;
    use super::ReviewExecutor;
    use super::ReviewSubmission;
    use super::WorkflowExecutor;

    struct StubCodeHost {
        open_pr: Option<u64>,
    }

    #[async_trait::async_trait]
    impl CodeHostAdapter for StubCodeHost {
        async fn find_open_pr(&self, _repo: &str, _issue_number: u64) -> Result<Option<u64>, CodeHostError> {
            Ok(self.open_pr)
        }
        async fn submit_review(&self, _repo: &str, _pr_number: u64, _submission: &ReviewSubmission) -> Result<(), CodeHostError> {
            Ok(())
        }
        async fn merge_pr(&self, _repo: &str, _pr_number: u64) -> Result<(), CodeHostError> {
            Ok(())
        }
        async fn get_pr_state(&self, _repo: &str, _pr_number: u64) -> Result<PrState, CodeHostError> {
            Ok(PrState::Open)
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
    async fn requests_review_on_an_open_pull_request() {
        let executor = ReviewExecutor::new(std::sync::Arc::new(StubCodeHost { open_pr: Some(5) }));
        let ctx = Context::new(None, OptsMap::new());
        let result = executor.execute(&sample_run(), &ctx).await.expect("executes");
        assert_eq!(result.result_type, ResultType::Named("requested".to_string()));
        assert_eq!(result.fields.get("requested").and_then(serde_json::Value::as_bool), Some(true));
        assert_eq!(result.fields.get("prNumber").and_then(serde_json::Value::as_u64), Some(5));
    }

    #[tokio::test]
    async fn still_returns_requested_when_no_pull_request_is_open() {
        let executor = ReviewExecutor::new(std::sync::Arc::new(StubCodeHost { open_pr: None }));
        let ctx = Context::new(None, OptsMap::new());
        let result = executor.execute(&sample_run(), &ctx).await.expect("executes");
        assert_eq!(result.result_type, ResultType::Named("requested".to_string()));
        assert_eq!(result.fields.get("requested").and_then(serde_json::Value::as_bool), Some(false));
    }
}
