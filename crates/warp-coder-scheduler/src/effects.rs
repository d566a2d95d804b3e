// warp-coder-scheduler/src/effects.rs
// ============================================================================
// Module: Effects
// Description: Best-effort hooks run after a processRun advancement commits.
// Purpose: Let executor results trigger comments or notifications without
//          executors depending on the notify client themselves.
// Dependencies: async_trait, warp_coder_adapters, warp_coder_core
// ============================================================================

//! ## Overview
//! An effect is looked up by `"<executorName>:<result.type>"` after the
//! atomic ledger commit (§4.6 step 7). Effects never propagate failures into
//! `processRun`: a failing effect is logged and otherwise invisible, since it
//! is a side channel, not part of the graph advancement itself (§7
//! EffectFailure).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use warp_coder_adapters::NotifyClient;
use warp_coder_adapters::NotifyMessage;
use warp_coder_core::Context;
use warp_coder_core::ExecutorResult;
use warp_coder_core::IssueRun;

/// Clarification-request marker, mirrored from `warp-coder-adapters::issues`.
const QUESTION_MARKER: &str = "<!-- warp-coder:question -->";

// ============================================================================
// SECTION: Effect Trait
// ============================================================================

/// A best-effort hook run after a result's outcomes have committed.
#[async_trait]
pub trait Effect: Send + Sync {
    /// Runs the effect. Implementations log their own failures; nothing is
    /// returned to `processRun`.
    async fn run(&self, run: &IssueRun, result: &ExecutorResult, ctx: &Context);
}

// ============================================================================
// SECTION: Effect Registry
// ============================================================================

/// A name-keyed registry of effects, keyed by `"<executorName>:<resultType>"`.
#[derive(Default)]
pub struct EffectRegistry {
    /// Registered effects, keyed by executor:result-type.
    effects: BTreeMap<String, Arc<dyn Effect>>,
}

impl std::fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectRegistry").field("registered", &self.effects.keys().collect::<Vec<_>>()).finish()
    }
}

impl EffectRegistry {
    /// Builds an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an effect under `"<executorName>:<resultType>"`.
    pub fn register(&mut self, executor_name: &str, result_type: &str, effect: Arc<dyn Effect>) {
        self.effects.insert(format!("{executor_name}:{result_type}"), effect);
    }

    /// Runs the effect registered for `"<executorName>:<resultType>"`, if any.
    pub async fn invoke(&self, executor_name: &str, result: &ExecutorResult, run: &IssueRun, ctx: &Context) {
        let key = format!("{executor_name}:{}", result.result_type.as_str());
        if let Some(effect) = self.effects.get(&key) {
            effect.run(run, result, ctx).await;
        }
    }
}

// ============================================================================
// SECTION: Built-in Effects
// ============================================================================

/// Posts a clarification-request comment carrying [`QUESTION_MARKER`].
///
/// Registered against `"implement:needs_clarification"`.
pub struct QuestionCommentEffect {
    /// Notify client used to post the comment.
    notify: Arc<dyn NotifyClient>,
}

impl QuestionCommentEffect {
    /// Builds a question-comment effect over the given notify client.
    #[must_use]
    pub fn new(notify: Arc<dyn NotifyClient>) -> Self {
        Self { notify }
    }
}

#[async_trait]
impl Effect for QuestionCommentEffect {
    async fn run(&self, run: &IssueRun, result: &ExecutorResult, ctx: &Context) {
        let question = result.fields.get("question").and_then(serde_json::Value::as_str).unwrap_or("(no question text)");
        let message = NotifyMessage {
            repo: run.repo.clone(),
            run_id: ctx.pipeline_run_id.clone(),
            title: Some("Clarification needed".to_string()),
            body: format!("{question}\n\n{QUESTION_MARKER}"),
        };
        if let Err(err) = self.notify.comment(&run.issue_id, &message).await {
            tracing::warn!(issue_id = %run.issue_id, error = %err, "question comment effect failed");
        }
    }
}

/// Posts a structured error comment carrying the `warp-coder:error` marker.
///
/// Registered against every `error`/`failed` result key a caller wants
/// surfaced as a user-visible comment (§7 "User-visible failure behavior").
pub struct ErrorCommentEffect {
    /// Notify client used to post the comment.
    notify: Arc<dyn NotifyClient>,
}

impl ErrorCommentEffect {
    /// Builds an error-comment effect over the given notify client.
    #[must_use]
    pub fn new(notify: Arc<dyn NotifyClient>) -> Self {
        Self { notify }
    }
}

#[async_trait]
impl Effect for ErrorCommentEffect {
    async fn run(&self, run: &IssueRun, result: &ExecutorResult, ctx: &Context) {
        let message_text = result
            .fields
            .get("message")
            .or_else(|| result.fields.get("error"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or("(no error detail)");
        let message = NotifyMessage {
            repo: run.repo.clone(),
            run_id: ctx.pipeline_run_id.clone(),
            title: Some("Action failed".to_string()),
            body: format!("{message_text}\n\n<!-- warp-coder:error {message_text} -->"),
        };
        if let Err(err) = self.notify.comment(&run.issue_id, &message).await {
            tracing::warn!(issue_id = %run.issue_id, error = %err, "error comment effect failed");
        }
    }
}

/// Registers the shipped default effects over the given notify client:
/// a clarification-question comment on `implement:needs_clarification`, and
/// a structured error comment on every built-in `error`/`failed` result key.
#[must_use]
pub fn default_effects(notify: Arc<dyn NotifyClient>) -> EffectRegistry {
    let mut registry = EffectRegistry::new();
    registry.register("implement", "needs_clarification", Arc::new(QuestionCommentEffect::new(Arc::clone(&notify))));
    registry.register("implement", "error", Arc::new(ErrorCommentEffect::new(Arc::clone(&notify))));
    registry.register("merge", "failed", Arc::new(ErrorCommentEffect::new(Arc::clone(&notify))));
    registry.register("run_deploy", "failed", Arc::new(ErrorCommentEffect::new(Arc::clone(&notify))));
    registry.register("publish", "failed", Arc::new(ErrorCommentEffect::new(notify)));
    registry
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use expect/unwrap for failure messages")]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use warp_coder_adapters::NotifyError;
    use warp_coder_core::IssueId;
    use warp_coder_core::IssueRunId;
    use warp_coder_core::ResultType;
    use warp_coder_core::Timestamp;
    use warp_coder_core::entities::OptsMap;

    use super::Context;
    use super::EffectRegistry;
    use super::ExecutorResult;
    use super::IssueRun;
    use super::NotifyClient;
    use super::NotifyMessage;
    use super::QuestionCommentEffect;
    use super::default_effects;

    struct RecordingNotify {
        bodies: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl NotifyClient for RecordingNotify {
        async fn comment(&self, _issue_id: &IssueId, message: &NotifyMessage) -> Result<(), NotifyError> {
            self.bodies.lock().expect("lock").push(message.body.clone());
            Ok(())
        }
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
    async fn question_comment_effect_carries_the_marker() {
        let notify = Arc::new(RecordingNotify { bodies: Mutex::new(Vec::new()) });
        let effect = QuestionCommentEffect::new(notify.clone());
        let mut result = ExecutorResult::new(ResultType::Named("needs_clarification".to_string()));
        result.fields.insert("question".to_string(), serde_json::Value::String("which database?".to_string()));
        let ctx = Context::new(None, OptsMap::new());
        effect.run(&sample_run(), &result, &ctx).await;
        let bodies = notify.bodies.lock().expect("lock");
        assert!(bodies[0].contains("which database?"));
        assert!(bodies[0].contains("<!-- warp-coder:question -->"));
    }

    #[tokio::test]
    async fn registry_dispatches_by_executor_and_result_type() {
        let notify = Arc::new(RecordingNotify { bodies: Mutex::new(Vec::new()) });
        let registry = default_effects(notify.clone());
        let mut result = ExecutorResult::new(ResultType::Named("needs_clarification".to_string()));
        result.fields.insert("question".to_string(), serde_json::Value::String("why?".to_string()));
        let ctx = Context::new(None, OptsMap::new());
        registry.invoke("implement", &result, &sample_run(), &ctx).await;
        assert_eq!(notify.bodies.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn registry_is_a_no_op_for_unregistered_keys() {
        let registry = EffectRegistry::new();
        let result = ExecutorResult::new(ResultType::Named("pr_created".to_string()));
        let ctx = Context::new(None, OptsMap::new());
        registry.invoke("implement", &result, &sample_run(), &ctx).await;
    }
}
