// warp-coder-builtins/src/graph_document.rs
// ============================================================================
// Module: Shipped Default Graph
// Description: The default workflow document driving issues from intake
//              through implementation, review, merge, deploy, and release.
// Purpose: Give a daemon with no user-supplied workflow file a working,
//          fully-validated graph out of the box.
// Dependencies: warp_coder_core::graph::document
// ============================================================================

//! ## Overview
//! Three phase groups (Build, Deploy, Release) each open with a single
//! `created` edge and contain the work acts that carry an issue through that
//! phase (§3 Data Model). The full act vocabulary from
//! `warp_coder_core::names::ActName` is used exactly once each; every edge's
//! outcome name is drawn from `warp_coder_core::names::OutcomeName`.
//!
//! `waiting`-capable executors (`await_reply`, `evaluate`, `await_deploy`)
//! declare `"waiting"` among their result types but the graph deliberately
//! has no edge for it: a `waiting` result is a scheduler no-op (§4.5) and is
//! never looked up against `node.results`, so giving it edges here would
//! only be dead structure. [`default_graph_executor_result_types`] strips
//! `"waiting"` before feeding an executor's declared types to
//! [`warp_coder_core::graph::Graph::compile`] so its cross-check does not
//! demand a `"waiting"` edge that would never be read.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use warp_coder_core::graph::document::EdgeDocument;
use warp_coder_core::graph::document::GraphDocument;
use warp_coder_core::graph::document::NodeDocument;
use warp_coder_core::names::ActName;
use warp_coder_core::names::OutcomeName;

// ============================================================================
// SECTION: Executor Names
// ============================================================================

/// Executor name registered for [`ActName::Implement`].
pub const IMPLEMENT: &str = "implement";
/// Executor name registered for [`ActName::AwaitReply`].
pub const AWAIT_REPLY: &str = "await_reply";
/// Executor name registered for [`ActName::Review`].
pub const REVIEW: &str = "review";
/// Executor name registered for [`ActName::Evaluate`].
pub const EVALUATE: &str = "evaluate";
/// Executor name registered for [`ActName::Revise`].
pub const REVISE: &str = "revise";
/// Executor name registered for [`ActName::Merge`].
pub const MERGE: &str = "merge";
/// Executor name registered for [`ActName::AwaitDeploy`].
pub const AWAIT_DEPLOY: &str = "await_deploy";
/// Executor name registered for [`ActName::RunDeploy`].
pub const RUN_DEPLOY: &str = "run_deploy";
/// Executor name registered for [`ActName::Publish`].
pub const PUBLISH: &str = "publish";

/// Phase-group label opened by [`ActName::Build`].
pub const BUILD_GROUP: &str = "Build";
/// Phase-group label opened by [`ActName::Deploy`].
pub const DEPLOY_GROUP: &str = "Deploy";
/// Phase-group label opened by [`ActName::Release`].
pub const RELEASE_GROUP: &str = "Release";

// ============================================================================
// SECTION: Document Builder
// ============================================================================

/// An edge with no `next`, naming an outcome recorded on `container`.
fn terminal_edge(outcome: OutcomeName, container: &str) -> EdgeDocument {
    EdgeDocument { name: outcome.as_str().to_string(), container: Some(container.to_string()), next: None }
}

/// An edge advancing to `next`, naming an outcome recorded on `container`.
fn edge(outcome: OutcomeName, container: &str, next: ActName) -> EdgeDocument {
    EdgeDocument {
        name: outcome.as_str().to_string(),
        container: Some(container.to_string()),
        next: Some(next.as_str().to_string()),
    }
}

/// A phase-group node with a single `created` result.
fn phase_group(label: &str, opens_with: EdgeDocument) -> NodeDocument {
    NodeDocument {
        label: label.to_string(),
        executor: "none".to_string(),
        group: None,
        results: BTreeMap::from([("created".to_string(), vec![opens_with])]),
    }
}

/// A work-act node belonging to a phase group.
fn work_act(label: &str, executor: &str, group: &str, results: BTreeMap<String, Vec<EdgeDocument>>) -> NodeDocument {
    NodeDocument { label: label.to_string(), executor: executor.to_string(), group: Some(group.to_string()), results }
}

/// Builds the shipped default workflow document (§4.7, §9).
#[must_use]
pub fn default_graph_document() -> GraphDocument {
    let mut acts = BTreeMap::new();

    acts.insert(
        ActName::Build.as_str().to_string(),
        phase_group(BUILD_GROUP, edge(OutcomeName::Building, BUILD_GROUP, ActName::Implement)),
    );
    acts.insert(
        ActName::Implement.as_str().to_string(),
        work_act(
            "Implement",
            IMPLEMENT,
            BUILD_GROUP,
            BTreeMap::from([
                ("pr_created".to_string(), vec![edge(OutcomeName::PrCreated, BUILD_GROUP, ActName::Review)]),
                (
                    "needs_clarification".to_string(),
                    vec![edge(OutcomeName::NeedsClarification, BUILD_GROUP, ActName::AwaitReply)],
                ),
                ("max_turns".to_string(), vec![edge(OutcomeName::Paused, BUILD_GROUP, ActName::Implement)]),
                ("error".to_string(), vec![terminal_edge(OutcomeName::ImplementationFailed, BUILD_GROUP)]),
            ]),
        ),
    );
    acts.insert(
        ActName::AwaitReply.as_str().to_string(),
        work_act(
            "Await Reply",
            AWAIT_REPLY,
            BUILD_GROUP,
            BTreeMap::from([("clarified".to_string(), vec![edge(OutcomeName::Clarified, BUILD_GROUP, ActName::Implement)])]),
        ),
    );
    acts.insert(
        ActName::Review.as_str().to_string(),
        work_act(
            "Review",
            REVIEW,
            BUILD_GROUP,
            BTreeMap::from([("requested".to_string(), vec![edge(OutcomeName::Reviewing, BUILD_GROUP, ActName::Evaluate)])]),
        ),
    );
    acts.insert(
        ActName::Evaluate.as_str().to_string(),
        work_act(
            "Evaluate",
            EVALUATE,
            BUILD_GROUP,
            BTreeMap::from([
                ("approved".to_string(), vec![edge(OutcomeName::Approved, BUILD_GROUP, ActName::Merge)]),
                (
                    "changes_requested".to_string(),
                    vec![edge(OutcomeName::ChangesRequested, BUILD_GROUP, ActName::Revise)],
                ),
            ]),
        ),
    );
    acts.insert(
        ActName::Revise.as_str().to_string(),
        work_act(
            "Revise",
            REVISE,
            BUILD_GROUP,
            BTreeMap::from([
                ("fixed".to_string(), vec![edge(OutcomeName::FixesApplied, BUILD_GROUP, ActName::Review)]),
                ("max_retries".to_string(), vec![terminal_edge(OutcomeName::MaxRetries, BUILD_GROUP)]),
            ]),
        ),
    );
    acts.insert(
        ActName::Merge.as_str().to_string(),
        work_act(
            "Merge",
            MERGE,
            BUILD_GROUP,
            BTreeMap::from([
                ("merged".to_string(), vec![edge(OutcomeName::Merged, BUILD_GROUP, ActName::Deploy)]),
                ("failed".to_string(), vec![terminal_edge(OutcomeName::MergeFailed, BUILD_GROUP)]),
            ]),
        ),
    );
    acts.insert(
        ActName::Deploy.as_str().to_string(),
        phase_group(DEPLOY_GROUP, edge(OutcomeName::AwaitingDeploy, DEPLOY_GROUP, ActName::AwaitDeploy)),
    );
    acts.insert(
        ActName::AwaitDeploy.as_str().to_string(),
        work_act(
            "Await Deploy",
            AWAIT_DEPLOY,
            DEPLOY_GROUP,
            BTreeMap::from([(
                "ready".to_string(),
                vec![edge(OutcomeName::AwaitingDeploy, DEPLOY_GROUP, ActName::RunDeploy)],
            )]),
        ),
    );
    acts.insert(
        ActName::RunDeploy.as_str().to_string(),
        work_act(
            "Run Deploy",
            RUN_DEPLOY,
            DEPLOY_GROUP,
            BTreeMap::from([
                ("deployed".to_string(), vec![edge(OutcomeName::Deployed, DEPLOY_GROUP, ActName::Release)]),
                ("failed".to_string(), vec![terminal_edge(OutcomeName::ReleaseFailed, DEPLOY_GROUP)]),
            ]),
        ),
    );
    acts.insert(
        ActName::Release.as_str().to_string(),
        phase_group(RELEASE_GROUP, edge(OutcomeName::Deployed, RELEASE_GROUP, ActName::Publish)),
    );
    acts.insert(
        ActName::Publish.as_str().to_string(),
        work_act(
            "Publish",
            PUBLISH,
            RELEASE_GROUP,
            BTreeMap::from([
                ("released".to_string(), vec![terminal_edge(OutcomeName::Released, RELEASE_GROUP)]),
                ("failed".to_string(), vec![terminal_edge(OutcomeName::ReleaseFailed, RELEASE_GROUP)]),
            ]),
        ),
    );

    let states = OutcomeName::all()
        .into_iter()
        .map(|outcome| (outcome.as_str().to_string(), board_column_for(outcome).to_string()))
        .collect();

    GraphDocument { acts, states, initial_act: ActName::Build.as_str().to_string() }
}

/// The symbolic board column each built-in outcome name maps to.
const fn board_column_for(outcome: OutcomeName) -> &'static str {
    match outcome {
        OutcomeName::Started => "todo",
        OutcomeName::Resumed
        | OutcomeName::ChangesRequested
        | OutcomeName::Clarified
        | OutcomeName::Building => "inProgress",
        OutcomeName::PrCreated | OutcomeName::FixesApplied | OutcomeName::Reviewing => "inReview",
        OutcomeName::Merged | OutcomeName::Approved => "readyForDeploy",
        OutcomeName::Deployed | OutcomeName::AwaitingDeploy => "deploy",
        OutcomeName::ImplementationFailed
        | OutcomeName::MaxRetries
        | OutcomeName::ReleaseFailed
        | OutcomeName::MergeFailed => "blocked",
        OutcomeName::NeedsClarification | OutcomeName::Paused => "waiting",
        OutcomeName::Aborted | OutcomeName::Released | OutcomeName::ManualRelease => "done",
    }
}

/// Strips `"waiting"` from each executor's declared result types before
/// feeding them to [`warp_coder_core::graph::Graph::compile`] (see module docs).
#[must_use]
pub fn default_graph_executor_result_types(
    declared: &BTreeMap<String, BTreeSet<String>>,
) -> BTreeMap<String, BTreeSet<String>> {
    declared
        .iter()
        .map(|(executor, types)| (executor.clone(), types.iter().filter(|t| t.as_str() != "waiting").cloned().collect()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use expect/unwrap for failure messages")]
mod tests {
    use std::collections::BTreeMap;
    use std::collections::BTreeSet;

    use warp_coder_core::graph::Graph;

    use super::AWAIT_DEPLOY;
    use super::AWAIT_REPLY;
    use super::EVALUATE;
    use super::IMPLEMENT;
    use super::MERGE;
    use super::PUBLISH;
    use super::REVIEW;
    use super::REVISE;
    use super::RUN_DEPLOY;
    use super::default_graph_document;
    use super::default_graph_executor_result_types;

    fn declared_types() -> BTreeMap<String, BTreeSet<String>> {
        BTreeMap::from([
            (
                IMPLEMENT.to_string(),
                BTreeSet::from([
                    "pr_created".to_string(),
                    "needs_clarification".to_string(),
                    "max_turns".to_string(),
                    "error".to_string(),
                ]),
            ),
            (AWAIT_REPLY.to_string(), BTreeSet::from(["waiting".to_string(), "clarified".to_string()])),
            (REVIEW.to_string(), BTreeSet::from(["requested".to_string()])),
            (EVALUATE.to_string(), BTreeSet::from(["waiting".to_string(), "approved".to_string(), "changes_requested".to_string()])),
            (REVISE.to_string(), BTreeSet::from(["fixed".to_string(), "max_retries".to_string()])),
            (MERGE.to_string(), BTreeSet::from(["merged".to_string(), "failed".to_string()])),
            (AWAIT_DEPLOY.to_string(), BTreeSet::from(["waiting".to_string(), "ready".to_string()])),
            (RUN_DEPLOY.to_string(), BTreeSet::from(["deployed".to_string(), "failed".to_string()])),
            (PUBLISH.to_string(), BTreeSet::from(["released".to_string(), "failed".to_string()])),
        ])
    }

    #[test]
    fn default_document_compiles_against_its_own_declared_result_types() {
        let document = default_graph_document();
        let declared = default_graph_executor_result_types(&declared_types());
        Graph::compile(&document, &declared).expect("shipped default graph should compile");
    }

    #[test]
    fn default_document_starts_at_build() {
        let document = default_graph_document();
        assert_eq!(document.initial_act, "Build");
    }

    #[test]
    fn states_table_covers_every_built_in_outcome() {
        let document = default_graph_document();
        for outcome in warp_coder_core::names::OutcomeName::all() {
            assert!(document.states.contains_key(outcome.as_str()), "missing states entry for {outcome}");
        }
    }

    #[test]
    fn every_act_is_reachable_from_the_initial_act() {
        use warp_coder_core::graph::analysis::GraphAnalysis;

        let document = default_graph_document();
        let declared = default_graph_executor_result_types(&declared_types());
        let graph = Graph::compile(&document, &declared).expect("compiles");
        let analysis = GraphAnalysis::compute(&graph);
        let reachable = analysis.find_reachable_acts(&graph, graph.initial_act());
        for act_name in graph.act_names() {
            assert!(reachable.contains(act_name), "{act_name} is unreachable from the initial act");
        }
    }
}
