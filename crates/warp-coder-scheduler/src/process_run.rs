// warp-coder-scheduler/src/process_run.rs
// ============================================================================
// Module: processRun
// Description: Advances a single issue run through the workflow graph until
//              it hits a terminal edge, a waiting result, or a same-act
//              self-transition.
// Purpose: Implement the per-run advancement loop the poll cycle launches
//          one task per work act for (§4.6 processRun).
// Dependencies: warp_coder_adapters, warp_coder_core, warp_coder_ledger
// ============================================================================

//! ## Overview
//! [`process_run`] is the only place an executor is invoked, a ledger batch
//! is committed on a run's behalf, or a board sync is fired. It never
//! returns an error: every failure mode named in §7 (`GraphViolation`,
//! `TransientExternal`, `ExecutorError`) is logged and the function returns
//! whatever state it reached, to be re-observed on the next poll.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use warp_coder_adapters::BoardAdapter;
use warp_coder_adapters::BoardColumn;
use warp_coder_adapters::BoardItem;
use warp_coder_adapters::ContextProviderRegistry;
use warp_coder_core::ActId;
use warp_coder_core::Context;
use warp_coder_core::ExecutorRegistry;
use warp_coder_core::ExecutorResult;
use warp_coder_core::IssueRun;
use warp_coder_core::PendingAct;
use warp_coder_core::PipelineRunId;
use warp_coder_core::ResultType;
use warp_coder_core::Timestamp;
use warp_coder_core::entities::ContainerId;
use warp_coder_core::entities::OptsMap;
use warp_coder_core::graph::Container;
use warp_coder_core::graph::Graph;
use warp_coder_core::graph::Node;
use warp_coder_ledger::LedgerClient;

use crate::effects::EffectRegistry;

/// Info needed to queue this advancement's telemetry call, if the work act
/// started a pipeline run (i.e. was not waiting-capable).
type PendingCall = (PipelineRunId, ActId, Option<f64>, u64, bool, Option<Value>);

/// Advances `run` through the graph until a terminal edge, a `waiting`
/// result, or a same-act self-transition is reached.
pub async fn process_run(
    graph: &Graph,
    executors: &ExecutorRegistry,
    context_providers: &ContextProviderRegistry,
    effects: &EffectRegistry,
    ledger: &Arc<LedgerClient>,
    board: &Arc<dyn BoardAdapter>,
    mut run: IssueRun,
) -> IssueRun {
    loop {
        let Some(act) = run.pending_act.clone() else {
            return run;
        };
        let Some(node) = graph.node(&act.name) else {
            tracing::error!(act = %act.name, "act names no node in the graph; halting this run for this cycle");
            return run;
        };

        let step = if node.is_phase_group() {
            match open_phase_group(ledger, node, &mut run).await {
                Some(()) => Step { result_type: "created".to_string(), outcome_opts: OptsMap::new(), next_act_opts: None, call: None, effect: None },
                None => return run,
            }
        } else {
            match invoke_work_act(executors, context_providers, &act, node, &run).await {
                Some(step) => step,
                None => return run,
            }
        };

        let Some(edges) = node.results.get(&step.result_type) else {
            tracing::error!(
                act = %act.name,
                result_type = %step.result_type,
                "executor returned a result type with no graph edges (GraphViolation)"
            );
            return run;
        };

        let Some(commit) = commit_edges(ledger, &run, &act, edges, &step).await else {
            return run;
        };

        run.latest_outcome = Some(commit.last_outcome.clone());
        sync_board(graph, board, &run, &commit.last_outcome);

        if let Some((executor_name, result, ctx)) = step.effect {
            effects.invoke(&executor_name, &result, &run, &ctx).await;
        }

        run.pending_act = commit.new_pending.map(|(id, name, opts)| PendingAct { id, name, opts });

        match &run.pending_act {
            None => return run,
            Some(pending) if pending.name == act.name => return run,
            Some(_) => {}
        }
    }
}

/// One advancement step's outcome, common to both phase-group and work-act
/// branches.
struct Step {
    /// The result type resolved against `node.results`.
    result_type: String,
    /// Options attached to every outcome this step produces.
    outcome_opts: OptsMap,
    /// Options set on the act this step's edge emits, if overridden.
    next_act_opts: Option<OptsMap>,
    /// Telemetry to queue alongside the edge commit, if a pipeline run started.
    call: Option<PendingCall>,
    /// The effect lookup to run after commit, if this step came from an executor.
    effect: Option<(String, ExecutorResult, Context)>,
}

/// Opens a phase-group node: queues and flushes its `batchGroup` call and
/// remembers the resulting group id on the run (§4.6 step 2).
async fn open_phase_group(ledger: &Arc<LedgerClient>, node: &Node, run: &mut IssueRun) -> Option<()> {
    let ledger = Arc::clone(ledger);
    let run_id = run.id.clone();
    let label = node.label.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let now = Timestamp::now();
        let mut batch = ledger.begin_batch();
        let group_id = batch.batch_group(&run_id, &label, now);
        batch.flush().map(|()| group_id)
    })
    .await;

    match outcome {
        Ok(Ok(group_id)) => {
            run.groups.insert(node.label.clone(), group_id);
            Some(())
        }
        Ok(Err(err)) => {
            tracing::warn!(error = %err, label = %node.label, "opening phase group failed; retrying next poll");
            None
        }
        Err(join_err) => {
            tracing::error!(error = %join_err, "ledger batch task panicked opening phase group");
            None
        }
    }
}

/// Invokes the registered executor for a work-act node (§4.6 step 3).
async fn invoke_work_act(
    executors: &ExecutorRegistry,
    context_providers: &ContextProviderRegistry,
    act: &PendingAct,
    node: &Node,
    run: &IssueRun,
) -> Option<Step> {
    let Some(executor_name) = node.executor.clone() else {
        unreachable!("invoke_work_act is only called for non-phase-group nodes");
    };
    let Some(executor) = executors.get(&executor_name) else {
        tracing::error!(act = %act.name, executor = %executor_name, "no executor registered; halting this run for this cycle");
        return None;
    };
    let can_wait = executor.can_wait();

    let extra_context = match context_providers.invoke(&executor_name, run).await {
        Ok(opts) => opts,
        Err(err) => {
            tracing::warn!(executor = %executor_name, error = %err, "context provider failed; continuing with no extra context");
            OptsMap::new()
        }
    };

    let mut pipeline_run_id = if can_wait { None } else { Some(PipelineRunId::generate(Timestamp::now())) };
    let ctx = Context {
        pipeline_run_id: pipeline_run_id.clone(),
        act_opts: act.opts.clone(),
        extra_context: extra_context.into_iter().collect(),
    };

    let started = Instant::now();
    let invocation = executors.invoke(&executor_name, run, &ctx).await;
    let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let result = match invocation {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(act = %act.name, executor = %executor_name, error = %err, "executor contract violation (GraphViolation)");
            return None;
        }
    };

    if matches!(result.result_type, ResultType::Waiting) {
        return None;
    }

    if pipeline_run_id.is_none() {
        pipeline_run_id = Some(PipelineRunId::generate(Timestamp::now()));
    }
    let pipeline_run_id = pipeline_run_id.unwrap_or_else(|| PipelineRunId::generate(Timestamp::now()));
    let success = result.result_type.as_str() != "error";

    let call = Some((
        pipeline_run_id,
        act.id.clone(),
        result.cost_usd,
        duration_ms,
        success,
        result.trace.clone().map(|trace| Value::Object(trace.payload)),
    ));

    Some(Step {
        result_type: result.result_type.as_str().to_string(),
        outcome_opts: result.outcome_opts.clone(),
        next_act_opts: result.next_act_opts.clone(),
        call,
        effect: Some((executor_name, result, ctx)),
    })
}

/// The outcome of a committed edge list.
struct Commit {
    /// The new pending act emitted by the last edge with a `next`, if any.
    new_pending: Option<(ActId, String, OptsMap)>,
    /// The last edge's outcome name, mirrored onto `run.latestOutcome`.
    last_outcome: String,
}

/// Queues and flushes one edge list as a single atomic ledger batch
/// (§4.6 step 5).
async fn commit_edges(
    ledger: &Arc<LedgerClient>,
    run: &IssueRun,
    act: &PendingAct,
    edges: &[warp_coder_core::graph::Edge],
    step: &Step,
) -> Option<Commit> {
    let ledger = Arc::clone(ledger);
    let run_id = run.id.clone();
    let groups = run.groups.clone();
    let edges = edges.to_vec();
    let outcome_opts = step.outcome_opts.clone();
    let next_act_opts = step.next_act_opts.clone();
    let fallback_opts = act.opts.clone();
    let call = step.call.clone();

    let outcome = tokio::task::spawn_blocking(move || {
        let now = Timestamp::now();
        let mut batch = ledger.begin_batch();
        let mut new_pending = None;
        let mut last_outcome = String::new();
        let mut last_container_is_issue = true;

        for edge in &edges {
            let container_id = match &edge.container {
                Container::Issue => ContainerId::IssueRun(run_id.clone()),
                Container::Group(label) => match groups.get(label) {
                    Some(group_id) => ContainerId::PhaseGroup(group_id.clone()),
                    None => {
                        tracing::warn!(label = %label, "edge container has no known group id; recording on the issue run");
                        ContainerId::IssueRun(run_id.clone())
                    }
                },
            };
            last_container_is_issue = matches!(container_id, ContainerId::IssueRun(_));
            let outcome_id = batch.batch_outcome(&container_id, &edge.name, &outcome_opts, now);
            if let Some(next) = &edge.next {
                let opts = next_act_opts.clone().unwrap_or_else(|| fallback_opts.clone());
                let act_id = batch.batch_act(&outcome_id, next, &opts, now);
                new_pending = Some((act_id, next.clone(), opts));
            }
            last_outcome = edge.name.clone();
        }

        if !last_container_is_issue && !last_outcome.is_empty() {
            batch.batch_outcome(&ContainerId::IssueRun(run_id.clone()), &last_outcome, &outcome_opts, now);
        }

        if let Some((pipeline_run_id, ref_act_id, cost_usd, duration_ms, success, trace)) = call {
            batch.batch_call(&pipeline_run_id, &ref_act_id, cost_usd, Some(duration_ms), success, trace);
        }

        batch.flush().map(|()| Commit { new_pending, last_outcome })
    })
    .await;

    match outcome {
        Ok(Ok(commit)) => Some(commit),
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "ledger flush failed; state will be re-observed next poll");
            None
        }
        Err(join_err) => {
            tracing::error!(error = %join_err, "ledger batch task panicked committing edges");
            None
        }
    }
}

/// Fires a best-effort board column sync for the last committed outcome
/// (§4.6 step 6).
fn sync_board(graph: &Graph, board: &Arc<dyn BoardAdapter>, run: &IssueRun, last_outcome: &str) {
    let Some(column_symbol) = graph.state_for(last_outcome) else {
        return;
    };
    let Some(handle) = run.board_item.clone() else {
        return;
    };
    let Some(column) = BoardColumn::from_symbol(column_symbol) else {
        tracing::warn!(symbol = %column_symbol, "states table names an unrecognized board column symbol");
        return;
    };

    let board = Arc::clone(board);
    let item = BoardItem {
        issue_id: run.issue_id.clone(),
        issue_number: run.issue_number,
        repo: run.repo.clone(),
        title: run.title.clone(),
        handle,
    };
    tokio::spawn(async move {
        if let Err(err) = board.sync_state(&item, column).await {
            tracing::warn!(error = %err, "board sync failed");
        }
    });
}
