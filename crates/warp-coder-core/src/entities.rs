// warp-coder-core/src/entities.rs
// ============================================================================
// Module: Warp Coder Durable Entities
// Description: In-memory projections of ledger state: runs, groups, pipeline
//              runs, outcomes, and acts.
// Purpose: Give the scheduler a typed view of the event log without ever
//          mutating it locally.
// Dependencies: crate::ids, crate::time, serde_json
// ============================================================================

//! ## Overview
//! None of these types are mutated in place once constructed. Durable state
//! lives in the ledger; every value here is a snapshot built from the
//! ledger's query responses (see `warp-coder-ledger::LedgerClient::
//! find_open_issue_runs`) or from the arguments to an append call about to be
//! queued. Closing over a stale snapshot is expected: the scheduler re-reads
//! open runs at the top of every poll cycle.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::ids::ActId;
use crate::ids::IssueId;
use crate::ids::IssueRunId;
use crate::ids::OutcomeId;
use crate::ids::PhaseGroupId;
use crate::ids::PipelineRunId;
use crate::time::Timestamp;

/// Free-form options map attached to outcomes, acts, and pipeline runs.
pub type OptsMap = Map<String, Value>;

// ============================================================================
// SECTION: Issue Run
// ============================================================================

/// The root durable entity for a single issue.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueRun {
    /// Stable id of this run.
    pub id: IssueRunId,
    /// The board-assigned issue identifier.
    pub issue_id: IssueId,
    /// The board's issue number.
    pub issue_number: u64,
    /// The repository this issue belongs to.
    pub repo: String,
    /// The issue title, as last observed.
    pub title: String,
    /// The name of the latest outcome observed for this run.
    pub latest_outcome: Option<String>,
    /// The run's pending act, if one is outstanding.
    pub pending_act: Option<PendingAct>,
    /// Phase-group label to phase-group id, for containers resolved by `in`.
    pub groups: BTreeMap<String, PhaseGroupId>,
    /// An opaque handle to the board item backing this run, once attached.
    pub board_item: Option<String>,
}

impl IssueRun {
    /// Returns `true` once a terminal outcome has closed this run.
    #[must_use]
    pub fn is_closed(&self, terminal_outcomes: &[&str]) -> bool {
        self.latest_outcome
            .as_deref()
            .is_some_and(|outcome| terminal_outcomes.contains(&outcome))
    }
}

/// A run's outstanding pending act.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAct {
    /// The act event's id.
    pub id: ActId,
    /// The act name, naming a node in the compiled graph.
    pub name: String,
    /// Options carried on the act, propagated into the executor's context.
    pub opts: OptsMap,
}

// ============================================================================
// SECTION: Phase Group
// ============================================================================

/// A durable sub-entity representing one phase of work.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseGroup {
    /// Stable id of this phase group.
    pub id: PhaseGroupId,
    /// The id of the issue run this group belongs to.
    pub parent_run_id: IssueRunId,
    /// The phase-group node's label (e.g. "Build", "Deploy", "Release").
    pub label: String,
}

// ============================================================================
// SECTION: Pipeline Run
// ============================================================================

/// A durable sub-entity created around each work-act execution.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    /// Stable id of this pipeline run.
    pub id: PipelineRunId,
    /// The act event this pipeline run is linked to.
    pub ref_act_id: ActId,
    /// Cost in US dollars, if the executor reported one.
    pub cost_usd: Option<f64>,
    /// Wall-clock duration of the execution, in milliseconds.
    pub duration_ms: Option<u64>,
    /// `true` when the executor's result type was not `"error"`.
    pub success: Option<bool>,
    /// Options the executor attached to its outcome.
    pub opts: OptsMap,
}

// ============================================================================
// SECTION: Outcome and Act Events
// ============================================================================

/// The container an outcome or act event is recorded against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerId {
    /// The issue run itself.
    IssueRun(IssueRunId),
    /// A phase group belonging to an issue run.
    PhaseGroup(PhaseGroupId),
    /// A pipeline run belonging to a work-act execution.
    PipelineRun(PipelineRunId),
}

/// An append-only outcome event.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// This event's id.
    pub id: OutcomeId,
    /// The container this outcome is recorded against.
    pub container: ContainerId,
    /// The outcome name, naming an entry in the states table.
    pub name: String,
    /// Free-form options carried by this outcome.
    pub opts: OptsMap,
    /// When this outcome was recorded.
    pub recorded_at: Timestamp,
}

/// An append-only act event, emitted from an outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Act {
    /// This event's id.
    pub id: ActId,
    /// The outcome event this act was emitted from.
    pub outcome_id: OutcomeId,
    /// The act name, naming a node in the compiled graph.
    pub name: String,
    /// Options attached to the act.
    pub opts: OptsMap,
    /// When this act was recorded.
    pub recorded_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use serde_json::Map;

    use super::IssueRun;
    use super::PendingAct;
    use crate::ids::ActId;
    use crate::ids::IssueId;
    use crate::ids::IssueRunId;
    use crate::time::Timestamp;

    fn sample_run(latest_outcome: Option<&str>) -> IssueRun {
        IssueRun {
            id: IssueRunId::generate(Timestamp::from_unix_millis(0)),
            issue_id: IssueId::new("issue-1"),
            issue_number: 1,
            repo: "acme/widgets".to_string(),
            title: "Fix the widget".to_string(),
            latest_outcome: latest_outcome.map(str::to_string),
            pending_act: Some(PendingAct {
                id: ActId::generate(Timestamp::from_unix_millis(0)),
                name: "Implement".to_string(),
                opts: Map::new(),
            }),
            groups: std::collections::BTreeMap::new(),
            board_item: None,
        }
    }

    #[test]
    fn is_closed_matches_terminal_outcome_set() {
        let run = sample_run(Some("Released"));
        assert!(run.is_closed(&["Aborted", "Released", "ManualRelease"]));
    }

    #[test]
    fn is_closed_false_for_non_terminal_outcome() {
        let run = sample_run(Some("PrCreated"));
        assert!(!run.is_closed(&["Aborted", "Released", "ManualRelease"]));
    }

    #[test]
    fn is_closed_false_with_no_outcome_yet() {
        let run = sample_run(None);
        assert!(!run.is_closed(&["Aborted"]));
    }
}
