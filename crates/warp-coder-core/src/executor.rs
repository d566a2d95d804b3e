// warp-coder-core/src/executor.rs
// ============================================================================
// Module: Warp Coder Executor Contract
// Description: The typed-result executor contract work acts implement.
// Purpose: Let the scheduler invoke arbitrary work-act logic through one
//          opaque, uniformly-shaped trait instead of hard-coding control flow
//          per act.
// Dependencies: async-trait, crate::entities, serde_json, thiserror
// ============================================================================

//! ## Overview
//! An executor is a named async function with declared `result_types`. The
//! scheduler never inspects *what* an executor does; it only enforces that
//! whatever `ExecutorResult::result_type` comes back is one of the types the
//! executor declared (§4.5, §8 invariant 3). Adapter-injected I/O (git, the
//! code-host, the coder subprocess, notifications) is reached through
//! [`Context::clients`], which is opaque here by design: this crate names the
//! contract, `warp-coder-adapters` supplies the concrete clients.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::entities::IssueRun;
use crate::entities::OptsMap;
use crate::ids::PipelineRunId;

// ============================================================================
// SECTION: Execution Trace
// ============================================================================

/// A bounded execution trace record attached to telemetry (§4.5).
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionTrace {
    /// Free-form trace payload, shaped by the executor that produced it.
    pub payload: OptsMap,
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// The context bundle passed to every executor invocation.
#[derive(Debug, Clone)]
pub struct Context {
    /// The pipeline run id this invocation is scoped to, once known.
    pub pipeline_run_id: Option<PipelineRunId>,
    /// Options carried on the pending act being advanced.
    pub act_opts: OptsMap,
    /// Extra context injected by a registered context provider (§4.7), keyed
    /// by the name the provider chose (the deploy provider uses `deployBatch`).
    pub extra_context: BTreeMap<String, Value>,
}

impl Context {
    /// Builds a context for an invocation with no extra provider context.
    #[must_use]
    pub fn new(pipeline_run_id: Option<PipelineRunId>, act_opts: OptsMap) -> Self {
        Self {
            pipeline_run_id,
            act_opts,
            extra_context: BTreeMap::new(),
        }
    }
}

// ============================================================================
// SECTION: Executor Result
// ============================================================================

/// The tagged result type every executor invocation produces.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutorResult {
    /// The result type; must be one of the executor's declared `result_types`.
    pub result_type: ResultType,
    /// Cost in US dollars attributed to this invocation, if known.
    pub cost_usd: Option<f64>,
    /// An execution trace record for ledger telemetry.
    pub trace: Option<ExecutionTrace>,
    /// Options attached to every outcome this result produces.
    pub outcome_opts: OptsMap,
    /// Options set on the act this result emits, if any.
    pub next_act_opts: Option<OptsMap>,
    /// Result-specific fields (error text, clarification question, PR
    /// numbers, coder session id, batched sibling issue ids, ...).
    pub fields: OptsMap,
}

impl ExecutorResult {
    /// Builds a minimal result with no cost, trace, or result-specific fields.
    #[must_use]
    pub fn new(result_type: ResultType) -> Self {
        Self {
            result_type,
            cost_usd: None,
            trace: None,
            outcome_opts: OptsMap::new(),
            next_act_opts: None,
            fields: OptsMap::new(),
        }
    }

    /// Builds the no-op `waiting` result (§4.5): no outcomes, no pipeline
    /// run, no board sync, pending act unchanged.
    #[must_use]
    pub fn waiting() -> Self {
        Self::new(ResultType::Waiting)
    }
}

/// The declared shape of a result type: either the reserved `waiting`
/// sentinel or an executor-specific named type (e.g. `pr`, `failed`, `error`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum ResultType {
    /// A no-op result: the run's pending act is unchanged.
    Waiting,
    /// An executor-specific named result type, matched against graph edges.
    Named(String),
}

impl ResultType {
    /// Returns the canonical string form used to key graph result types.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Waiting => "waiting",
            Self::Named(name) => name.as_str(),
        }
    }
}

impl From<&str> for ResultType {
    fn from(value: &str) -> Self {
        if value == "waiting" { Self::Waiting } else { Self::Named(value.to_string()) }
    }
}

// ============================================================================
// SECTION: Executor Errors
// ============================================================================

/// Errors an executor invocation can fail with.
///
/// These are distinct from `ExecutorResult { result_type: Named("error"), .. }`:
/// a declared `error` result flows through ordinary graph edges, while an
/// [`ExecutorError`] means the contract itself could not be honored (an
/// unregistered executor, or a returned result type the executor never
/// declared — §7 `GraphViolation`).
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// No executor is registered under this name.
    #[error("no executor registered under name '{0}'")]
    NotRegistered(String),
    /// The executor returned a result type it never declared.
    #[error("executor '{0}' returned undeclared result type '{1}'")]
    UndeclaredResultType(String, String),
}

// ============================================================================
// SECTION: Workflow Executor Trait
// ============================================================================

/// A named, async work-act implementation.
#[async_trait]
pub trait WorkflowExecutor: Send + Sync {
    /// The stable name the graph's `executor` field resolves against.
    fn name(&self) -> &str;

    /// The result types this executor may return; checked against every
    /// invocation's `ExecutorResult::result_type` by the scheduler.
    fn result_types(&self) -> &BTreeSet<String>;

    /// Returns `true` if this executor may return the `waiting` result.
    fn can_wait(&self) -> bool {
        self.result_types().contains("waiting")
    }

    /// Executes one invocation against the current run and context.
    ///
    /// # Errors
    ///
    /// Implementations should prefer an `ExecutorResult { result_type:
    /// Named("error"), .. }` for recoverable failures; this return path is
    /// reserved for failures that should not flow through graph edges.
    async fn execute(&self, run: &IssueRun, ctx: &Context) -> Result<ExecutorResult, ExecutorError>;
}

// ============================================================================
// SECTION: Executor Registry
// ============================================================================

/// A lookup table from executor name to its registered implementation.
#[derive(Clone, Default)]
pub struct ExecutorRegistry {
    /// Registered executors, keyed by their own declared name.
    executors: BTreeMap<String, Arc<dyn WorkflowExecutor>>,
}

impl std::fmt::Debug for ExecutorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutorRegistry").field("executors", &self.executors.keys().collect::<Vec<_>>()).finish()
    }
}

impl ExecutorRegistry {
    /// Builds an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an executor implementation under its own name.
    pub fn register(&mut self, executor: Arc<dyn WorkflowExecutor>) {
        self.executors.insert(executor.name().to_string(), executor);
    }

    /// Looks up a registered executor by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn WorkflowExecutor>> {
        self.executors.get(name)
    }

    /// Builds the `executor name -> declared result types` index the graph
    /// loader cross-checks node result-type keys against (§4.2).
    #[must_use]
    pub fn result_types_index(&self) -> BTreeMap<String, BTreeSet<String>> {
        self.executors.iter().map(|(name, executor)| (name.clone(), executor.result_types().clone())).collect()
    }

    /// Invokes a registered executor and enforces its declared result types.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::NotRegistered`] if `executor_name` is
    /// unknown, or [`ExecutorError::UndeclaredResultType`] if the invocation
    /// returned a result type the executor never declared.
    pub async fn invoke(
        &self,
        executor_name: &str,
        run: &IssueRun,
        ctx: &Context,
    ) -> Result<ExecutorResult, ExecutorError> {
        let executor = self.get(executor_name).ok_or_else(|| ExecutorError::NotRegistered(executor_name.to_string()))?;
        let result = executor.execute(run, ctx).await?;
        if !executor.result_types().contains(result.result_type.as_str()) {
            return Err(ExecutorError::UndeclaredResultType(
                executor_name.to_string(),
                result.result_type.as_str().to_string(),
            ));
        }
        Ok(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use expect/unwrap for failure messages")]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::Context;
    use super::ExecutorError;
    use super::ExecutorRegistry;
    use super::ExecutorResult;
    use super::ResultType;
    use super::WorkflowExecutor;
    use crate::entities::IssueRun;
    use crate::ids::IssueId;
    use crate::ids::IssueRunId;
    use crate::time::Timestamp;

    struct StubExecutor {
        result_types: BTreeSet<String>,
        returns: ResultType,
    }

    #[async_trait]
    impl WorkflowExecutor for StubExecutor {
        fn name(&self) -> &str {
            "stub"
        }

        fn result_types(&self) -> &BTreeSet<String> {
            &self.result_types
        }

        async fn execute(&self, _run: &IssueRun, _ctx: &Context) -> Result<ExecutorResult, ExecutorError> {
            Ok(ExecutorResult::new(self.returns.clone()))
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
    async fn invoke_enforces_declared_result_types() {
        let mut registry = ExecutorRegistry::new();
        registry.register(Arc::new(StubExecutor {
            result_types: BTreeSet::from(["pr".to_string()]),
            returns: ResultType::Named("unexpected".to_string()),
        }));
        let run = sample_run();
        let ctx = Context::new(None, crate::entities::OptsMap::new());
        let err = registry.invoke("stub", &run, &ctx).await.unwrap_err();
        assert!(matches!(err, ExecutorError::UndeclaredResultType(_, _)));
    }

    #[tokio::test]
    async fn invoke_succeeds_for_declared_result_type() {
        let mut registry = ExecutorRegistry::new();
        registry.register(Arc::new(StubExecutor {
            result_types: BTreeSet::from(["pr".to_string()]),
            returns: ResultType::Named("pr".to_string()),
        }));
        let run = sample_run();
        let ctx = Context::new(None, crate::entities::OptsMap::new());
        let result = registry.invoke("stub", &run, &ctx).await.expect("should succeed");
        assert_eq!(result.result_type, ResultType::Named("pr".to_string()));
    }

    #[tokio::test]
    async fn invoke_fails_for_unregistered_executor() {
        let registry = ExecutorRegistry::new();
        let run = sample_run();
        let ctx = Context::new(None, crate::entities::OptsMap::new());
        let err = registry.invoke("missing", &run, &ctx).await.unwrap_err();
        assert!(matches!(err, ExecutorError::NotRegistered(_)));
    }
}
