// warp-coder-scheduler/src/scheduler.rs
// ============================================================================
// Module: Poll Cycle
// Description: The scheduler's outer loop: load open runs, intake, attach
//              board items, scan terminal columns, retry from blocked, and
//              dispatch each run's pending act.
// Purpose: Implement the seven-step poll cycle (§4.6) atop `process_run`.
// Dependencies: tokio, warp_coder_adapters, warp_coder_core, warp_coder_ledger
// ============================================================================

//! ## Overview
//! [`Scheduler`] owns every long-lived collaborator (the compiled graph, its
//! derived [`GraphAnalysis`], the three registries, the ledger client, and
//! the board adapter) and drives one poll cycle at a time from [`Scheduler::run`].
//! Waiting-capable acts are dispatched per cycle up to [`waiting_inline_cap`],
//! uncounted against `concurrency`; ordinary work acts are spawned onto the
//! async runtime's worker pool, one task per issue, tracked in an in-flight
//! map keyed by issue id so a run already being advanced is never
//! double-dispatched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use warp_coder_adapters::BoardAdapter;
use warp_coder_adapters::BoardColumn;
use warp_coder_adapters::BoardItem;
use warp_coder_adapters::ContextProviderRegistry;
use warp_coder_core::ExecutorRegistry;
use warp_coder_core::GraphAnalysis;
use warp_coder_core::IssueId;
use warp_coder_core::IssueRun;
use warp_coder_core::OutcomeName;
use warp_coder_core::PendingAct;
use warp_coder_core::Timestamp;
use warp_coder_core::entities::ContainerId;
use warp_coder_core::entities::OptsMap;
use warp_coder_core::graph::Graph;
use warp_coder_core::graph::analysis::RetryTarget;
use warp_coder_ledger::LedgerClient;
use warp_coder_ledger::OpenIssueRun;

use crate::effects::EffectRegistry;
use crate::error::SchedulerError;
use crate::process_run::process_run;

/// Per-cycle worker slots: roughly 5x the configured concurrency, floored at
/// 10, so a burst of waiting-capable acts never starves intake (§4.6 step 6).
fn waiting_inline_cap(concurrency: usize) -> usize {
    (concurrency.saturating_mul(5)).max(10)
}

// ============================================================================
// SECTION: Scheduler
// ============================================================================

/// Owns every collaborator the poll cycle needs and drives it to completion.
pub struct Scheduler {
    /// The compiled workflow graph.
    graph: Arc<Graph>,
    /// Derived lookup tables computed once from the graph.
    analysis: Arc<GraphAnalysis>,
    /// Registered work-act executors.
    executors: Arc<ExecutorRegistry>,
    /// Registered context providers.
    context_providers: Arc<ContextProviderRegistry>,
    /// Registered post-commit effects.
    effects: Arc<EffectRegistry>,
    /// The durable state store.
    ledger: Arc<LedgerClient>,
    /// The project-tracking board integration.
    board: Arc<dyn BoardAdapter>,
    /// Maximum number of work acts advanced concurrently.
    concurrency: usize,
    /// Delay between the end of one poll cycle and the start of the next.
    poll_interval: Duration,
}

impl Scheduler {
    /// Builds a scheduler over a compiled graph and its collaborators.
    #[must_use]
    pub fn new(
        graph: Graph,
        executors: ExecutorRegistry,
        context_providers: ContextProviderRegistry,
        effects: EffectRegistry,
        ledger: Arc<LedgerClient>,
        board: Arc<dyn BoardAdapter>,
        concurrency: usize,
        poll_interval: Duration,
    ) -> Self {
        let analysis = GraphAnalysis::compute(&graph);
        Self {
            graph: Arc::new(graph),
            analysis: Arc::new(analysis),
            executors: Arc::new(executors),
            context_providers: Arc::new(context_providers),
            effects: Arc::new(effects),
            ledger,
            board,
            concurrency: concurrency.max(1),
            poll_interval,
        }
    }

    /// Runs the poll loop until `shutdown_rx` reports `true`.
    ///
    /// On the first shutdown signal the loop stops scheduling new cycles and
    /// awaits every in-flight run's task handle without cancelling it; a
    /// second signal is handled entirely by the process's signal listener
    /// (see [`crate::shutdown`]), which exits immediately instead of waiting
    /// for this future to resolve.
    pub async fn run(self: Arc<Self>, mut shutdown_rx: watch::Receiver<bool>) {
        let mut in_flight: BTreeMap<IssueId, JoinHandle<()>> = BTreeMap::new();

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            if let Err(err) = self.poll_cycle(&mut in_flight).await {
                tracing::warn!(error = %err, "poll cycle failed; retrying next interval");
            }

            tokio::select! {
                () = tokio::time::sleep(self.poll_interval) => {}
                _ = shutdown_rx.changed() => {
                    tracing::info!("scheduler received shutdown signal; exiting poll loop");
                    break;
                }
            }
        }

        tracing::info!(in_flight = in_flight.len(), "waiting for in-flight runs to finish");
        for (issue_id, handle) in in_flight {
            if let Err(err) = handle.await {
                tracing::warn!(issue_id = %issue_id, error = %err, "in-flight run task panicked");
            }
        }
    }

    /// Runs one full poll cycle (§4.6 steps 1-6).
    async fn poll_cycle(&self, in_flight: &mut BTreeMap<IssueId, JoinHandle<()>>) -> Result<(), SchedulerError> {
        in_flight.retain(|_, handle| !handle.is_finished());

        let mut runs = self.load_open_runs().await?;
        self.intake(&mut runs).await?;
        self.attach_board_items(&mut runs).await?;
        self.scan_terminal_columns(&mut runs).await?;
        self.retry_from_blocked(&mut runs).await;
        self.dispatch(runs, in_flight);

        Ok(())
    }

    /// Step 1: loads every not-yet-terminal run from the ledger.
    async fn load_open_runs(&self) -> Result<BTreeMap<IssueId, IssueRun>, SchedulerError> {
        let ledger = Arc::clone(&self.ledger);
        let open_runs = tokio::task::spawn_blocking(move || ledger.find_open_issue_runs())
            .await
            .map_err(|err| SchedulerError::BatchTaskFailed(err.to_string()))??;
        Ok(open_runs.into_iter().map(|run| (run.issue_id.clone(), open_run_to_issue_run(run))).collect())
    }

    /// Step 2: creates a new run for every board-intake issue not already open.
    async fn intake(&self, runs: &mut BTreeMap<IssueId, IssueRun>) -> Result<(), SchedulerError> {
        let candidates = self.board.scan_new_issues().await?;
        for item in candidates {
            if runs.contains_key(&item.issue_id) {
                continue;
            }
            match self.begin_run(&item).await {
                Ok(run) => {
                    runs.insert(item.issue_id.clone(), run);
                }
                Err(err) => {
                    tracing::warn!(issue_id = %item.issue_id, error = %err, "intake failed to open a run; retrying next poll");
                }
            }
        }
        Ok(())
    }

    /// Queues and flushes a new run's opening batch: the run itself, a
    /// `Started` outcome, and its synthetic initial pending act.
    async fn begin_run(&self, item: &BoardItem) -> Result<IssueRun, SchedulerError> {
        let ledger = Arc::clone(&self.ledger);
        let issue_id = item.issue_id.clone();
        let issue_number = item.issue_number;
        let repo = item.repo.clone();
        let title = item.title.clone();
        let initial_act = self.graph.initial_act().to_string();

        let run = tokio::task::spawn_blocking(move || {
            let now = Timestamp::now();
            let mut batch = ledger.begin_batch();
            let run_id = batch.batch_run(&issue_id, issue_number, &repo, &title, now);
            let outcome_id = batch.batch_outcome(
                &ContainerId::IssueRun(run_id.clone()),
                OutcomeName::Started.as_str(),
                &OptsMap::new(),
                now,
            );
            let act_id = batch.batch_act(&outcome_id, &initial_act, &OptsMap::new(), now);
            batch.flush().map(|()| IssueRun {
                id: run_id,
                issue_id,
                issue_number,
                repo,
                title,
                latest_outcome: Some(OutcomeName::Started.as_str().to_string()),
                pending_act: Some(PendingAct { id: act_id, name: initial_act, opts: OptsMap::new() }),
                groups: BTreeMap::new(),
                board_item: None,
            })
        })
        .await
        .map_err(|err| SchedulerError::BatchTaskFailed(err.to_string()))??;

        Ok(run)
    }

    /// Step 3: attaches the board's opaque item handle to every open run.
    async fn attach_board_items(&self, runs: &mut BTreeMap<IssueId, IssueRun>) -> Result<(), SchedulerError> {
        let items = self.board.get_all_items().await?;
        let by_issue: BTreeMap<&IssueId, &BoardItem> = items.iter().map(|item| (&item.issue_id, item)).collect();
        for run in runs.values_mut() {
            if let Some(item) = by_issue.get(&run.issue_id) {
                run.board_item = Some(item.handle.clone());
            }
        }
        Ok(())
    }

    /// Step 4: drops runs the board has moved to a terminal column, after
    /// recording their closing outcome.
    async fn scan_terminal_columns(&self, runs: &mut BTreeMap<IssueId, IssueRun>) -> Result<(), SchedulerError> {
        let aborted = self.board.scan_aborted().await?;
        let done = self.board.scan_done().await?;

        for issue_id in aborted.iter() {
            if let Some(run) = runs.get(issue_id) {
                self.append_closing_outcome(run, OutcomeName::Aborted).await;
            }
        }
        for issue_id in done.iter().filter(|issue_id| !aborted.contains(*issue_id)) {
            if let Some(run) = runs.get(issue_id) {
                self.append_closing_outcome(run, OutcomeName::ManualRelease).await;
            }
        }

        runs.retain(|issue_id, _| !aborted.contains(issue_id) && !done.contains(issue_id));
        Ok(())
    }

    /// Queues and flushes a single closing outcome on the issue run.
    async fn append_closing_outcome(&self, run: &IssueRun, outcome: OutcomeName) {
        let ledger = Arc::clone(&self.ledger);
        let run_id = run.id.clone();
        let result = tokio::task::spawn_blocking(move || {
            let now = Timestamp::now();
            let mut batch = ledger.begin_batch();
            batch.batch_outcome(&ContainerId::IssueRun(run_id), outcome.as_str(), &OptsMap::new(), now);
            batch.flush()
        })
        .await;

        match result {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::warn!(issue_id = %run.issue_id, error = %err, "failed to record closing outcome"),
            Err(join_err) => tracing::error!(issue_id = %run.issue_id, error = %join_err, "ledger batch task panicked closing a run"),
        }
    }

    /// Step 5: resumes runs left idle by a prior blocked terminal outcome,
    /// once the board no longer shows them in the Blocked column.
    async fn retry_from_blocked(&self, runs: &mut BTreeMap<IssueId, IssueRun>) {
        let blocked = match self.board.scan_blocked().await {
            Ok(blocked) => blocked,
            Err(err) => {
                tracing::warn!(error = %err, "scanning the blocked column failed; skipping retry-from-blocked this cycle");
                return;
            }
        };

        let retry_candidates: Vec<IssueId> = runs
            .iter()
            .filter(|(issue_id, run)| {
                run.pending_act.is_none()
                    && !blocked.contains(*issue_id)
                    && run.latest_outcome.as_deref().is_some_and(|outcome| self.analysis.retry_target_for(outcome).is_some())
            })
            .map(|(issue_id, _)| issue_id.clone())
            .collect();

        for issue_id in retry_candidates {
            let target = {
                let run = &runs[&issue_id];
                let Some(outcome) = run.latest_outcome.as_deref() else { continue };
                let Some(target) = self.analysis.retry_target_for(outcome) else { continue };
                target.clone()
            };
            if let Some(run) = runs.get_mut(&issue_id) {
                self.resume_run(run, &target).await;
            }
        }
    }

    /// Resumes one run: records `Resumed` and the retry act, then
    /// fire-and-forgets a board sync to the phase's initial board state.
    async fn resume_run(&self, run: &mut IssueRun, target: &RetryTarget) {
        let container = match &target.group_label {
            Some(label) => run.groups.get(label).map(|id| ContainerId::PhaseGroup(id.clone())),
            None => None,
        }
        .unwrap_or_else(|| ContainerId::IssueRun(run.id.clone()));

        let ledger = Arc::clone(&self.ledger);
        let act_name = target.act_name.clone();
        let result = tokio::task::spawn_blocking(move || {
            let now = Timestamp::now();
            let mut batch = ledger.begin_batch();
            let outcome_id = batch.batch_outcome(&container, OutcomeName::Resumed.as_str(), &OptsMap::new(), now);
            let act_id = batch.batch_act(&outcome_id, &act_name, &OptsMap::new(), now);
            batch.flush().map(|()| (act_id, act_name))
        })
        .await;

        match result {
            Ok(Ok((act_id, act_name))) => {
                run.pending_act = Some(PendingAct { id: act_id, name: act_name, opts: OptsMap::new() });
                run.latest_outcome = Some(OutcomeName::Resumed.as_str().to_string());
                self.sync_resumed_board_state(run, target);
            }
            Ok(Err(err)) => tracing::warn!(issue_id = %run.issue_id, error = %err, "failed to resume a blocked run; retrying next poll"),
            Err(join_err) => tracing::error!(issue_id = %run.issue_id, error = %join_err, "ledger batch task panicked resuming a run"),
        }
    }

    /// Fire-and-forget board sync to a resumed run's initial board state.
    fn sync_resumed_board_state(&self, run: &IssueRun, target: &RetryTarget) {
        let Some(board_state) = &target.board_state else { return };
        let Some(handle) = run.board_item.clone() else { return };
        let Some(column) = BoardColumn::from_symbol(board_state) else {
            tracing::warn!(symbol = %board_state, "retry target names an unrecognized board column symbol");
            return;
        };

        let board = Arc::clone(&self.board);
        let item = BoardItem {
            issue_id: run.issue_id.clone(),
            issue_number: run.issue_number,
            repo: run.repo.clone(),
            title: run.title.clone(),
            handle,
        };
        tokio::spawn(async move {
            if let Err(err) = board.sync_state(&item, column).await {
                tracing::warn!(error = %err, "board sync failed after resuming a blocked run");
            }
        });
    }

    /// Step 6: advances every run with a pending act, inline for
    /// waiting-capable acts (bounded per cycle) and on the worker pool for
    /// everything else (bounded by available concurrency slots).
    fn dispatch(&self, runs: BTreeMap<IssueId, IssueRun>, in_flight: &mut BTreeMap<IssueId, JoinHandle<()>>) {
        let mut inline_budget = waiting_inline_cap(self.concurrency);
        let mut inline_batch = Vec::new();

        for (issue_id, run) in runs {
            if in_flight.contains_key(&issue_id) {
                continue;
            }
            let Some(pending) = &run.pending_act else { continue };
            if self.is_waiting_capable(&pending.name) {
                if inline_budget == 0 {
                    continue;
                }
                inline_budget -= 1;
                inline_batch.push(run);
                continue;
            }
            if in_flight.len() >= self.concurrency {
                continue;
            }
            let handle = self.spawn_work(run);
            in_flight.insert(issue_id, handle);
        }

        if !inline_batch.is_empty() {
            self.run_inline(inline_batch);
        }
    }

    /// Returns `true` if the pending act's node is a phase group, or a work
    /// act whose registered executor may return `waiting`.
    fn is_waiting_capable(&self, act_name: &str) -> bool {
        let Some(node) = self.graph.node(act_name) else { return false };
        if node.is_phase_group() {
            return true;
        }
        node.executor.as_deref().and_then(|executor_name| self.executors.get(executor_name)).is_some_and(|executor| executor.can_wait())
    }

    /// Dispatches a batch of waiting-capable runs without charging them
    /// against `concurrency`: each is expected to return in O(milliseconds)
    /// (§5), so the cap in [`waiting_inline_cap`] bounds the batch size
    /// instead of tracking these tasks in the in-flight map.
    fn run_inline(&self, batch: Vec<IssueRun>) {
        for run in batch {
            let graph = Arc::clone(&self.graph);
            let executors = Arc::clone(&self.executors);
            let context_providers = Arc::clone(&self.context_providers);
            let effects = Arc::clone(&self.effects);
            let ledger = Arc::clone(&self.ledger);
            let board = Arc::clone(&self.board);
            tokio::spawn(async move {
                process_run(&graph, &executors, &context_providers, &effects, &ledger, &board, run).await;
            });
        }
    }

    /// Spawns one work act's advancement onto the runtime's worker pool.
    fn spawn_work(&self, run: IssueRun) -> JoinHandle<()> {
        let graph = Arc::clone(&self.graph);
        let executors = Arc::clone(&self.executors);
        let context_providers = Arc::clone(&self.context_providers);
        let effects = Arc::clone(&self.effects);
        let ledger = Arc::clone(&self.ledger);
        let board = Arc::clone(&self.board);
        tokio::spawn(async move {
            process_run(&graph, &executors, &context_providers, &effects, &ledger, &board, run).await;
        })
    }
}

/// Projects a ledger query result into the scheduler's working [`IssueRun`].
///
/// `board_item` is never carried by the ledger (§5: not durable state); it is
/// re-attached every cycle from the board's own item list.
fn open_run_to_issue_run(run: OpenIssueRun) -> IssueRun {
    IssueRun {
        id: run.id,
        issue_id: run.issue_id,
        issue_number: run.issue_number,
        repo: run.repo,
        title: run.title,
        latest_outcome: run.latest_outcome,
        pending_act: run.pending_act,
        groups: run.groups,
        board_item: None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use expect/unwrap for failure messages")]
mod tests {
    use super::waiting_inline_cap;

    #[test]
    fn waiting_inline_cap_is_floored_at_ten() {
        assert_eq!(waiting_inline_cap(1), 10);
        assert_eq!(waiting_inline_cap(0), 10);
    }

    #[test]
    fn waiting_inline_cap_scales_with_concurrency() {
        assert_eq!(waiting_inline_cap(4), 20);
        assert_eq!(waiting_inline_cap(10), 50);
    }
}
