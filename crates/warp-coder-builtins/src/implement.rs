// warp-coder-builtins/src/implement.rs
// ============================================================================
// Module: Implement Executor
// Description: Drives the coder against an issue's working tree until a pull
//              request exists or a clarifying question is raised.
// Purpose: Provide the shipped default implementation of `ActName::Implement`.
// Dependencies: warp_coder_adapters, warp_coder_core
// ============================================================================

//! ## Overview
//! Implement runs a full coder session (§4.7 `CoderClient::run`) with the
//! repository's default tool set. If the session hits its turn budget
//! (`CompletionSubtype::MaxTurns`) the executor returns `max_turns`,
//! carrying the coder's `sessionId` and an incremented `retryCount` forward
//! on the re-emitted act so the next invocation resumes the same session.
//! Otherwise, if the coder asks a clarifying question (signalled by a
//! `"ask_question"` tool use in the event stream) the executor returns
//! `needs_clarification`; failing that it asks the code host whether a pull
//! request now exists for the issue and returns `pr_created` or `error`
//! accordingly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use async_trait::async_trait;
use serde_json::Value;
use warp_coder_adapters::CodeHostAdapter;
use warp_coder_adapters::CoderClient;
use warp_coder_adapters::CoderEvent;
use warp_coder_adapters::CompletionSubtype;
use warp_coder_adapters::RunOptions;
use warp_coder_adapters::coder::trace_from_envelope;
use warp_coder_core::Context;
use warp_coder_core::ExecutorError;
use warp_coder_core::ExecutorResult;
use warp_coder_core::IssueRun;
use warp_coder_core::ResultType;
use warp_coder_core::WorkflowExecutor;
use warp_coder_core::entities::OptsMap;

use crate::graph_document::IMPLEMENT;

/// Tool name the coder uses to raise a clarifying question mid-session.
const ASK_QUESTION_TOOL: &str = "ask_question";
/// Field name the coder's resumable session id is carried on, in act options.
const SESSION_ID_FIELD: &str = "sessionId";
/// Field name the max-turns retry counter is carried on, in act options.
const RETRY_COUNT_FIELD: &str = "retryCount";

// ============================================================================
// SECTION: Implement Executor
// ============================================================================

/// Drives a full coder session to implement an issue, then checks for a
/// resulting pull request.
pub struct ImplementExecutor {
    /// Declared result types, fixed at construction.
    result_types: BTreeSet<String>,
    /// The coder subprocess client.
    coder: Arc<dyn CoderClient>,
    /// The code-host adapter, used to confirm a pull request now exists.
    code_host: Arc<dyn CodeHostAdapter>,
}

impl ImplementExecutor {
    /// Builds an `Implement` executor over the given adapters.
    #[must_use]
    pub fn new(coder: Arc<dyn CoderClient>, code_host: Arc<dyn CodeHostAdapter>) -> Self {
        Self {
            result_types: BTreeSet::from([
                "pr_created".to_string(),
                "needs_clarification".to_string(),
                "max_turns".to_string(),
                "error".to_string(),
            ]),
            coder,
            code_host,
        }
    }
}

#[async_trait]
impl WorkflowExecutor for ImplementExecutor {
    fn name(&self) -> &str {
        IMPLEMENT
    }

    fn result_types(&self) -> &BTreeSet<String> {
        &self.result_types
    }

    async fn execute(&self, run: &IssueRun, ctx: &Context) -> Result<ExecutorResult, ExecutorError> {
        let previous_retry_count = ctx.act_opts.get(RETRY_COUNT_FIELD).and_then(Value::as_u64).unwrap_or(0);

        let question = Arc::new(Mutex::new(None::<String>));
        let captured = Arc::clone(&question);
        let mut on_event = move |event: CoderEvent| {
            if let CoderEvent::ToolUse { name, input } = event {
                if name == ASK_QUESTION_TOOL {
                    let text = input.get("question").and_then(Value::as_str).unwrap_or_default().to_string();
                    *captured.lock().unwrap_or_else(PoisonError::into_inner) = Some(text);
                }
            }
        };

        let options = RunOptions {
            max_turns: None,
            allowed_tools: None,
            disallowed_tools: Vec::new(),
            working_dir: format!("./workspaces/{}", run.repo.replace('/', "-")),
        };
        let prompt = format!("Implement issue #{}: {}", run.issue_number, run.title);

        let envelope = match self.coder.run(&prompt, &options, &mut on_event).await {
            Ok(envelope) => envelope,
            Err(err) => {
                let mut result = ExecutorResult::new(ResultType::Named("error".to_string()));
                result.fields.insert("message".to_string(), Value::String(err.to_string()));
                return Ok(result);
            }
        };

        if envelope.subtype == CompletionSubtype::MaxTurns {
            let retry_count = previous_retry_count + 1;
            let mut result = ExecutorResult::new(ResultType::Named("max_turns".to_string()));
            result.fields.insert(RETRY_COUNT_FIELD.to_string(), Value::from(retry_count));
            let mut next_act_opts = OptsMap::new();
            next_act_opts.insert(RETRY_COUNT_FIELD.to_string(), Value::from(retry_count));
            if let Some(session_id) = &envelope.session_id {
                result.fields.insert(SESSION_ID_FIELD.to_string(), Value::String(session_id.clone()));
                next_act_opts.insert(SESSION_ID_FIELD.to_string(), Value::String(session_id.clone()));
            }
            result.next_act_opts = Some(next_act_opts);
            result.cost_usd = envelope.cost_usd;
            result.trace = Some(trace_from_envelope(&envelope));
            return Ok(result);
        }

        let mut result = if let Some(text) = question.lock().unwrap_or_else(PoisonError::into_inner).take() {
            let mut result = ExecutorResult::new(ResultType::Named("needs_clarification".to_string()));
            result.fields.insert("question".to_string(), Value::String(text));
            result
        } else {
            match self.code_host.find_open_pr(&run.repo, run.issue_number).await {
                Ok(Some(pr_number)) => {
                    let mut result = ExecutorResult::new(ResultType::Named("pr_created".to_string()));
                    result.fields.insert("prNumber".to_string(), Value::from(pr_number));
                    result
                }
                Ok(None) => {
                    let mut result = ExecutorResult::new(ResultType::Named("error".to_string()));
                    result
                        .fields
                        .insert("message".to_string(), Value::String("no pull request found after session".to_string()));
                    result
                }
                Err(err) => {
                    let mut result = ExecutorResult::new(ResultType::Named("error".to_string()));
                    result.fields.insert("message".to_string(), Value::String(err.to_string()));
                    result
                }
            }
        };

        result.cost_usd = envelope.cost_usd;
        result.trace = Some(trace_from_envelope(&envelope));
        Ok(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use expect/unwrap for failure messages")]
mod tests {
    use warp_coder_adapters::CoderEnvelope;
    use warp_coder_adapters::CoderError;
    use warp_coder_adapters::CodeHostError;
    use warp_coder_adapters::CompletionSubtype;
    use warp_coder_adapters::PrCommit;
    use warp_coder_adapters::PrFile;
    use warp_coder_adapters::PrState;
    use warp_coder_adapters::ReviewSubmission;
    use warp_coder_core::IssueId;
    use warp_coder_core::IssueRunId;
    use warp_coder_core::ResultType;
    use warp_coder_core::Timestamp;
    use warp_coder_core::entities::OptsMap;

    use super::CodeHostAdapter;
    use super::Context;
    use super::CoderClient;
    use super::CoderEvent;
    use super::ImplementExecutor;
    use super::IssueRun;
    use super::RunOptions;
    use super::WorkflowExecutor;

    struct StubCoder {
        asks_question: bool,
        hits_max_turns: bool,
        session_id: Option<&'static str>,
    }

    #[async_trait::async_trait]
    impl CoderClient for StubCoder {
        async fn run(
            &self,
            _prompt: &str,
            _options: &RunOptions,
            on_event: &mut (dyn FnMut(CoderEvent) + Send),
        ) -> Result<CoderEnvelope, CoderError> {
            if self.asks_question {
                on_event(CoderEvent::ToolUse {
                    name: "ask_question".to_string(),
                    input: serde_json::json!({ "question": "which database?" }),
                });
            }
            let subtype = if self.hits_max_turns { CompletionSubtype::MaxTurns } else { CompletionSubtype::Success };
            Ok(CoderEnvelope {
                result_text: "done".to_string(),
                cost_usd: Some(0.2),
                session_id: self.session_id.map(str::to_string),
                subtype,
            })
        }

        async fn one_shot(&self, _prompt: &str, _options: &RunOptions) -> Result<CoderEnvelope, CoderError> {
            unreachable!("implement only uses full sessions")
        }
    }

    struct StubCodeHost {
        pr_after_session: Option<u64>,
    }

    #[async_trait::async_trait]
    impl CodeHostAdapter for StubCodeHost {
        async fn find_open_pr(&self, _repo: &str, _issue_number: u64) -> Result<Option<u64>, CodeHostError> {
            Ok(self.pr_after_session)
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
    async fn returns_pr_created_once_a_pull_request_exists() {
        let executor = ImplementExecutor::new(
            std::sync::Arc::new(StubCoder { asks_question: false, hits_max_turns: false, session_id: None }),
            std::sync::Arc::new(StubCodeHost { pr_after_session: Some(7) }),
        );
        let ctx = Context::new(None, OptsMap::new());
        let result = executor.execute(&sample_run(), &ctx).await.expect("executes");
        assert_eq!(result.result_type, ResultType::Named("pr_created".to_string()));
        assert_eq!(result.fields.get("prNumber").and_then(serde_json::Value::as_u64), Some(7));
    }

    #[tokio::test]
    async fn returns_needs_clarification_when_the_coder_asks_a_question() {
        let executor = ImplementExecutor::new(
            std::sync::Arc::new(StubCoder { asks_question: true, hits_max_turns: false, session_id: None }),
            std::sync::Arc::new(StubCodeHost { pr_after_session: None }),
        );
        let ctx = Context::new(None, OptsMap::new());
        let result = executor.execute(&sample_run(), &ctx).await.expect("executes");
        assert_eq!(result.result_type, ResultType::Named("needs_clarification".to_string()));
        assert_eq!(result.fields.get("question").and_then(serde_json::Value::as_str), Some("which database?"));
    }

    #[tokio::test]
    async fn returns_error_when_no_pull_request_is_found_after_the_session() {
        let executor = ImplementExecutor::new(
            std::sync::Arc::new(StubCoder { asks_question: false, hits_max_turns: false, session_id: None }),
            std::sync::Arc::new(StubCodeHost { pr_after_session: None }),
        );
        let ctx = Context::new(None, OptsMap::new());
        let result = executor.execute(&sample_run(), &ctx).await.expect("executes");
        assert_eq!(result.result_type, ResultType::Named("error".to_string()));
    }

    #[tokio::test]
    async fn returns_max_turns_and_carries_the_session_id_and_retry_count_forward() {
        let executor = ImplementExecutor::new(
            std::sync::Arc::new(StubCoder { asks_question: false, hits_max_turns: true, session_id: Some("s1") }),
            std::sync::Arc::new(StubCodeHost { pr_after_session: None }),
        );
        let mut act_opts = OptsMap::new();
        act_opts.insert("retryCount".to_string(), serde_json::Value::from(2));
        let ctx = Context::new(None, act_opts);

        let result = executor.execute(&sample_run(), &ctx).await.expect("executes");
        assert_eq!(result.result_type, ResultType::Named("max_turns".to_string()));
        assert_eq!(result.fields.get("sessionId").and_then(serde_json::Value::as_str), Some("s1"));
        assert_eq!(result.fields.get("retryCount").and_then(serde_json::Value::as_u64), Some(3));

        let next_act_opts = result.next_act_opts.expect("carries sessionId and retryCount forward");
        assert_eq!(next_act_opts.get("sessionId").and_then(serde_json::Value::as_str), Some("s1"));
        assert_eq!(next_act_opts.get("retryCount").and_then(serde_json::Value::as_u64), Some(3));
    }
}
