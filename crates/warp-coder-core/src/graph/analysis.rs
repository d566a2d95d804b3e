// warp-coder-core/src/graph/analysis.rs
// ============================================================================
// Module: Workflow Graph Analysis
// Description: Derived, read-only structures computed once from a Graph.
// Purpose: Give the scheduler fast lookup tables instead of re-walking the
//          graph on every poll cycle.
// Dependencies: crate::graph::{Container, Graph}, std::collections::{BTreeMap, BTreeSet, VecDeque}
// ============================================================================

//! ## Overview
//! [`GraphAnalysis::compute`] walks a compiled [`Graph`] exactly once and
//! produces the four derived structures described in the data model: the
//! act-to-executor index, the result-types-by-executor cache, the flattened
//! transition edge list, and the retry-target map the scheduler's
//! retry-from-blocked step consults. It also exposes the pure traversal
//! helpers `find_reachable_acts` and `find_orphan_outcomes`, plus the
//! standalone `topo_sort` helper used to order release-planning DAGs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::VecDeque;

use super::Container;
use super::Graph;

// ============================================================================
// SECTION: Transition Edges
// ============================================================================

/// The kind of a flattened transition edge, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Advances to another act.
    Transition,
    /// The edge has no `next`; the branch ends here.
    Terminal,
    /// The edge's container differs from the issue run (an automatic mirror
    /// outcome is emitted alongside it).
    Auto,
}

/// A flattened transition edge, carrying its originating act.
#[derive(Debug, Clone)]
pub struct TransitionEdge {
    /// The act the edge originates from.
    pub from: String,
    /// The result type the edge belongs to.
    pub via: String,
    /// The act the edge advances to, if any.
    pub to: Option<String>,
    /// The outcome name recorded.
    pub outcome: String,
    /// The container label the outcome is recorded on (`"Issue"` or a label).
    pub in_label: String,
    /// The edge's classification for diagnostics.
    pub kind: EdgeKind,
}

// ============================================================================
// SECTION: Retry Targets
// ============================================================================

/// A retry target for a terminal-result outcome (§4.3, §4.6 step 5).
#[derive(Debug, Clone)]
pub struct RetryTarget {
    /// The work-act name to re-emit as the retry's pending act.
    pub act_name: String,
    /// The parent phase-group label of that act, if any.
    pub group_label: Option<String>,
    /// The board state derived from the phase-group's `created` edge.
    pub board_state: Option<String>,
}

// ============================================================================
// SECTION: Graph Analysis
// ============================================================================

/// Derived, read-only structures computed once from a compiled [`Graph`].
#[derive(Debug, Clone)]
pub struct GraphAnalysis {
    /// Work-act name to executor name.
    act_executor: BTreeMap<String, String>,
    /// Executor name to declared result types, as seen in the graph.
    result_types_by_executor: BTreeMap<String, BTreeSet<String>>,
    /// Every edge in the graph, flattened and ordered.
    transition_edges: Vec<TransitionEdge>,
    /// Outcome name to retry target, for terminal-result outcomes.
    retry_targets: BTreeMap<String, RetryTarget>,
}

impl GraphAnalysis {
    /// Computes every derived structure from a compiled graph.
    #[must_use]
    pub fn compute(graph: &Graph) -> Self {
        let act_executor = compute_act_executor(graph);
        let result_types_by_executor = compute_result_types_by_executor(graph);
        let transition_edges = compute_transition_edges(graph);
        let retry_targets = compute_retry_targets(graph, &transition_edges);

        Self {
            act_executor,
            result_types_by_executor,
            transition_edges,
            retry_targets,
        }
    }

    /// Returns the executor name registered for a work-act name.
    #[must_use]
    pub fn executor_for(&self, act_name: &str) -> Option<&str> {
        self.act_executor.get(act_name).map(String::as_str)
    }

    /// Returns the declared result types for an executor name, if seen in the graph.
    #[must_use]
    pub fn result_types_for(&self, executor_name: &str) -> Option<&BTreeSet<String>> {
        self.result_types_by_executor.get(executor_name)
    }

    /// Returns the flattened transition edge list.
    #[must_use]
    pub fn transition_edges(&self) -> &[TransitionEdge] {
        &self.transition_edges
    }

    /// Returns the retry target registered for an outcome name, if any.
    #[must_use]
    pub fn retry_target_for(&self, outcome_name: &str) -> Option<&RetryTarget> {
        self.retry_targets.get(outcome_name)
    }

    /// Finds every act reachable from `start_act` via transition edges (BFS).
    #[must_use]
    pub fn find_reachable_acts(&self, graph: &Graph, start_act: &str) -> BTreeSet<String> {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(start_act.to_string());

        while let Some(act_name) = queue.pop_front() {
            if !visited.insert(act_name.clone()) {
                continue;
            }
            let Some(node) = graph.node(&act_name) else {
                continue;
            };
            for edges in node.results.values() {
                for edge in edges {
                    if let Some(next) = &edge.next
                        && !visited.contains(next)
                    {
                        queue.push_back(next.clone());
                    }
                }
            }
        }
        visited
    }

    /// Finds outcome names in the states table produced by no edge.
    ///
    /// These are external-only outcomes such as Started/Resumed/Aborted,
    /// appended directly by the scheduler rather than via a graph edge.
    #[must_use]
    pub fn find_orphan_outcomes(&self, graph: &Graph) -> BTreeSet<String> {
        let produced: BTreeSet<&str> =
            self.transition_edges.iter().map(|edge| edge.outcome.as_str()).collect();
        graph
            .states()
            .keys()
            .filter(|outcome| !produced.contains(outcome.as_str()))
            .cloned()
            .collect()
    }
}

// ============================================================================
// SECTION: Topological Sort
// ============================================================================

/// Orders `nodes` consistently with every `(before, after)` pair in `edges`.
///
/// Pure helper for release-planning DAGs (e.g. ordering a deploy batch by
/// declared repo dependencies). Deterministic: among nodes with no remaining
/// predecessor, the lexicographically smallest is emitted first. Returns
/// `None` if `edges` describes a cycle; nodes named by an edge but absent
/// from `nodes` are ignored.
#[must_use]
pub fn topo_sort(nodes: &[String], edges: &[(String, String)]) -> Option<Vec<String>> {
    let known: BTreeSet<&str> = nodes.iter().map(String::as_str).collect();
    let mut successors: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    let mut in_degree: BTreeMap<&str, usize> = nodes.iter().map(|node| (node.as_str(), 0)).collect();

    for (before, after) in edges {
        if !known.contains(before.as_str()) || !known.contains(after.as_str()) {
            continue;
        }
        if successors.entry(before.as_str()).or_default().insert(after.as_str()) {
            *in_degree.entry(after.as_str()).or_insert(0) += 1;
        }
    }

    let mut ready: BTreeSet<&str> =
        in_degree.iter().filter(|(_, degree)| **degree == 0).map(|(name, _)| *name).collect();
    let mut ordered = Vec::with_capacity(nodes.len());

    while let Some(&next) = ready.iter().next() {
        ready.remove(next);
        ordered.push(next.to_string());
        if let Some(targets) = successors.get(next) {
            for &target in targets {
                if let Some(degree) = in_degree.get_mut(target) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.insert(target);
                    }
                }
            }
        }
    }

    if ordered.len() == nodes.len() { Some(ordered) } else { None }
}

// ============================================================================
// SECTION: Computation Helpers
// ============================================================================

/// Builds the act-name to executor-name index.
fn compute_act_executor(graph: &Graph) -> BTreeMap<String, String> {
    let mut index = BTreeMap::new();
    for act_name in graph.act_names() {
        if let Some(node) = graph.node(act_name)
            && let Some(executor) = &node.executor
        {
            index.insert(act_name.to_string(), executor.clone());
        }
    }
    index
}

/// Builds the executor-name to declared-result-types index.
fn compute_result_types_by_executor(graph: &Graph) -> BTreeMap<String, BTreeSet<String>> {
    let mut index: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for act_name in graph.act_names() {
        let Some(node) = graph.node(act_name) else {
            continue;
        };
        let Some(executor) = &node.executor else {
            continue;
        };
        let entry = index.entry(executor.clone()).or_default();
        for result_type in node.results.keys() {
            entry.insert(result_type.clone());
        }
    }
    index
}

/// Flattens every node's edges into one ordered list.
fn compute_transition_edges(graph: &Graph) -> Vec<TransitionEdge> {
    let mut edges = Vec::new();
    for act_name in graph.act_names() {
        let Some(node) = graph.node(act_name) else {
            continue;
        };
        for (result_type, edge_list) in &node.results {
            for edge in edge_list {
                let in_label = match &edge.container {
                    Container::Issue => "Issue".to_string(),
                    Container::Group(label) => label.clone(),
                };
                let kind = if edge.next.is_none() {
                    EdgeKind::Terminal
                } else if matches!(edge.container, Container::Group(_)) {
                    EdgeKind::Auto
                } else {
                    EdgeKind::Transition
                };
                edges.push(TransitionEdge {
                    from: act_name.to_string(),
                    via: result_type.clone(),
                    to: edge.next.clone(),
                    outcome: edge.name.clone(),
                    in_label,
                    kind,
                });
            }
        }
    }
    edges
}

/// Builds the outcome-name to retry-target index from terminal edges.
fn compute_retry_targets(
    graph: &Graph,
    transition_edges: &[TransitionEdge],
) -> BTreeMap<String, RetryTarget> {
    let mut targets = BTreeMap::new();
    for edge in transition_edges {
        if edge.kind != EdgeKind::Terminal {
            continue;
        }
        let Some(node) = graph.node(&edge.from) else {
            continue;
        };
        let group_label = node.group.clone();
        let board_state = group_label
            .as_deref()
            .and_then(|label| graph.node(label))
            .and_then(|group_node| group_node.results.get(super::document::CREATED_RESULT))
            .and_then(|created_edges| created_edges.first())
            .and_then(|created_edge| graph.state_for(&created_edge.name))
            .map(str::to_string);

        targets.insert(
            edge.outcome.clone(),
            RetryTarget {
                act_name: edge.from.clone(),
                group_label,
                board_state,
            },
        );
    }
    targets
}

// ============================================================================
// SECTION: Tests
// ============================================================================
