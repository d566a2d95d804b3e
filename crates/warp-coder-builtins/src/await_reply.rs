// warp-coder-builtins/src/await_reply.rs
// ============================================================================
// Module: Await Reply Executor
// Description: Polls an issue's comment thread for a human reply following a
//              clarifying question.
// Purpose: Provide the shipped default implementation of
//          `ActName::AwaitReply`.
// Dependencies: warp_coder_adapters, warp_coder_core
// ============================================================================

//! ## Overview
//! AwaitReply is the canonical `waiting`-capable executor (§4.5): every poll
//! it re-reads the issue thread and returns `waiting` until a non-bot
//! comment follows the most recent clarification-question comment, at which
//! point it returns `clarified` carrying the reply text.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use warp_coder_adapters::IssuesClient;
use warp_coder_adapters::issues::has_reply_since_question;
use warp_coder_adapters::issues::last_non_bot_comment;
use warp_coder_core::Context;
use warp_coder_core::ExecutorError;
use warp_coder_core::ExecutorResult;
use warp_coder_core::IssueRun;
use warp_coder_core::ResultType;
use warp_coder_core::WorkflowExecutor;

use crate::graph_document::AWAIT_REPLY;

// ============================================================================
// SECTION: Await Reply Executor
// ============================================================================

/// Waits for a human reply on an issue thread following a clarification question.
pub struct AwaitReplyExecutor {
    /// Declared result types, fixed at construction.
    result_types: BTreeSet<String>,
    /// The issue tracker client.
    issues: Arc<dyn IssuesClient>,
}

impl AwaitReplyExecutor {
    /// Builds an `AwaitReply` executor over the given issues client.
    #[must_use]
    pub fn new(issues: Arc<dyn IssuesClient>) -> Self {
        Self { result_types: BTreeSet::from(["waiting".to_string(), "clarified".to_string()]), issues }
    }
}

#[async_trait]
impl WorkflowExecutor for AwaitReplyExecutor {
    fn name(&self) -> &str {
        AWAIT_REPLY
    }

    fn result_types(&self) -> &BTreeSet<String> {
        &self.result_types
    }

    async fn execute(&self, run: &IssueRun, _ctx: &Context) -> Result<ExecutorResult, ExecutorError> {
        let comments = match self.issues.get_issue_comments(&run.repo, run.issue_number).await {
            Ok(comments) => comments,
            Err(_) => return Ok(ExecutorResult::waiting()),
        };

        if !has_reply_since_question(&comments) {
            return Ok(ExecutorResult::waiting());
        }

        let mut result = ExecutorResult::new(ResultType::Named("clarified".to_string()));
        if let Some(reply) = last_non_bot_comment(&comments) {
            result.fields.insert("reply".to_string(), Value::String(reply.body.clone()));
            result.fields.insert("author".to_string(), Value::String(reply.author.clone()));
        }
        Ok(result)
    }
}
