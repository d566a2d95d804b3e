// warp-coder-builtins/src/publish.rs
// ============================================================================
// Module: Publish Executor
// Description: Announces a released issue back onto its thread.
// Purpose: Provide the shipped default implementation of `ActName::Publish`.
// Dependencies: warp_coder_adapters, warp_coder_core
// ============================================================================

//! ## Overview
//! Publish is the last work act in the Release phase group. It posts a
//! release announcement comment and returns `released`; a notification
//! failure is treated as a hard failure rather than silently dropped, since
//! the announcement is this act's only reason to exist (§4.7).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use warp_coder_adapters::NotifyClient;
use warp_coder_adapters::NotifyMessage;
use warp_coder_core::Context;
use warp_coder_core::ExecutorError;
use warp_coder_core::ExecutorResult;
use warp_coder_core::IssueRun;
use warp_coder_core::ResultType;
use warp_coder_core::WorkflowExecutor;

use crate::graph_document::PUBLISH;

// ============================================================================
// SECTION: Publish Executor
// ============================================================================

/// Announces a released issue back onto its thread.
pub struct PublishExecutor {
    /// Declared result types, fixed at construction.
    result_types: BTreeSet<String>,
    /// The notify client.
    notify: Arc<dyn NotifyClient>,
}

impl PublishExecutor {
    /// Builds a `Publish` executor over the given notify client.
    #[must_use]
    pub fn new(notify: Arc<dyn NotifyClient>) -> Self {
        Self { result_types: BTreeSet::from(["released".to_string(), "failed".to_string()]), notify }
    }
}

#[async_trait]
impl WorkflowExecutor for PublishExecutor {
    fn name(&self) -> &str {
        PUBLISH
    }

    fn result_types(&self) -> &BTreeSet<String> {
        &self.result_types
    }

    async fn execute(&self, run: &IssueRun, ctx: &Context) -> Result<ExecutorResult, ExecutorError> {
        let message = NotifyMessage {
            repo: run.repo.clone(),
            run_id: ctx.pipeline_run_id.clone(),
            title: Some("Released".to_string()),
            body: format!("Issue #{} (\"{}\") has been released.", run.issue_number, run.title),
        };

        match self.notify.comment(&run.issue_id, &message).await {
            Ok(()) => Ok(ExecutorResult::new(ResultType::Named("released".to_string()))),
            Err(err) => {
                let mut result = ExecutorResult::new(ResultType::Named("failed".to_string()));
                result.fields.insert("message".to_string(), Value::String(err.to_string()));
                Ok(result)
            }
        }
    }
}
