// warp-coder-core/src/graph/mod.rs
// ============================================================================
// Module: Workflow Graph
// Description: Compiled, validated workflow graph and its loader.
// Purpose: Turn an untrusted `GraphDocument` into a cross-checked graph object
//          the scheduler can advance without re-validating on every step.
// Dependencies: crate::graph::document, std::collections::{BTreeMap, BTreeSet}, thiserror
// ============================================================================

//! ## Overview
//! The workflow graph is user data (see Design Notes), not hard-coded control
//! flow, so it is validated once at load time and then treated as immutable
//! for the life of the process. [`Graph::compile`] is the only way to obtain
//! a [`Graph`]; every invariant in the data model is checked there, so every
//! other module can assume a compiled graph is internally consistent.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod analysis;
pub mod document;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use thiserror::Error;

use self::document::CREATED_RESULT;
use self::document::EdgeDocument;
use self::document::GraphDocument;
use self::document::ISSUE_CONTAINER;
use self::document::NO_EXECUTOR;

// ============================================================================
// SECTION: Compiled Graph
// ============================================================================

/// A compiled, validated workflow graph.
#[derive(Debug, Clone)]
pub struct Graph {
    /// Compiled node definitions, keyed by act name.
    nodes: BTreeMap<String, Node>,
    /// Outcome name to symbolic board column.
    states: BTreeMap<String, String>,
    /// The act name the graph starts advancing from.
    initial_act: String,
}

/// A compiled graph node.
#[derive(Debug, Clone)]
pub struct Node {
    /// Human-readable label.
    pub label: String,
    /// `None` for a phase-group node; `Some(executor name)` for a work act.
    pub executor: Option<String>,
    /// Parent phase-group label, if declared.
    pub group: Option<String>,
    /// Result-type name to edge sequence.
    pub results: BTreeMap<String, Vec<Edge>>,
}

impl Node {
    /// Returns `true` if this node is a phase-group node (sentinel executor `"none"`).
    #[must_use]
    pub fn is_phase_group(&self) -> bool {
        self.executor.is_none()
    }
}

/// A compiled transition edge.
#[derive(Debug, Clone)]
pub struct Edge {
    /// Outcome name recorded on the resolved container.
    pub name: String,
    /// Container the outcome is recorded on, already normalised.
    pub container: Container,
    /// The act this edge emits, if any.
    pub next: Option<String>,
}

/// A resolved edge container reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    /// Record on the issue run itself.
    Issue,
    /// Record on the named phase-group.
    Group(String),
}

impl Graph {
    /// Returns the node for an act name, if present.
    #[must_use]
    pub fn node(&self, act_name: &str) -> Option<&Node> {
        self.nodes.get(act_name)
    }

    /// Returns the act name the graph starts advancing from.
    #[must_use]
    pub fn initial_act(&self) -> &str {
        &self.initial_act
    }

    /// Returns every act name in the graph.
    pub fn act_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Returns the board column for an outcome name, if declared.
    #[must_use]
    pub fn state_for(&self, outcome_name: &str) -> Option<&str> {
        self.states.get(outcome_name).map(String::as_str)
    }

    /// Returns the full states table.
    #[must_use]
    pub const fn states(&self) -> &BTreeMap<String, String> {
        &self.states
    }

    /// Compiles and validates a [`GraphDocument`] into a [`Graph`].
    ///
    /// `executor_result_types` maps a registered executor name to its
    /// declared result types; an executor absent from this map is treated as
    /// unregistered and its node's result-type keys are not cross-checked
    /// (the scheduler will refuse to advance through it at runtime instead).
    ///
    /// # Errors
    ///
    /// Returns [`GraphError`] for any invariant violation in §3/§4.2.
    pub fn compile(
        document: &GraphDocument,
        executor_result_types: &BTreeMap<String, BTreeSet<String>>,
    ) -> Result<Self, GraphError> {
        ensure_initial_act_exists(document)?;
        let nodes = compile_nodes(document)?;
        ensure_next_targets_exist(&nodes)?;
        ensure_container_labels_exist(&nodes)?;
        ensure_outcomes_in_states_table(&nodes, &document.states)?;
        ensure_declared_result_types(&nodes, executor_result_types)?;

        Ok(Self {
            nodes,
            states: document.states.clone(),
            initial_act: document.initial_act.clone(),
        })
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal graph validation errors (§4.2).
#[derive(Debug, Error)]
pub enum GraphError {
    /// The document's initial act does not name an existing node.
    #[error("initial act '{0}' does not name a node in the graph")]
    UnknownInitialAct(String),
    /// A node's label is empty.
    #[error("act '{0}' has an empty label")]
    EmptyLabel(String),
    /// A node declared no result types.
    #[error("act '{0}' declares no result types")]
    EmptyResults(String),
    /// A phase-group node did not declare exactly one `created` result.
    #[error("phase-group act '{0}' must declare exactly one result named 'created'")]
    PhaseGroupResultShape(String),
    /// An edge's result list was empty.
    #[error("act '{0}' result type '{1}' has no edges")]
    EmptyEdgeList(String, String),
    /// An edge has an empty outcome name.
    #[error("act '{0}' result type '{1}' has an edge with an empty name")]
    EmptyOutcomeName(String, String),
    /// An edge's `next` names an act absent from the graph.
    #[error("act '{0}' edge '{1}' names unknown next act '{2}'")]
    UnknownNextAct(String, String, String),
    /// An edge's `in` is neither absent, `"Issue"`, nor a known phase-group label.
    #[error("act '{0}' edge '{1}' names unknown container '{2}'")]
    UnknownContainer(String, String, String),
    /// An outcome name used in an edge has no entry in the states table.
    #[error("outcome '{0}' used by act '{1}' has no entry in the states table")]
    OutcomeNotInStatesTable(String, String),
    /// A work act's result-type keys are not a subset of its executor's declared types.
    #[error("act '{0}' declares result type '{1}' not declared by executor '{2}'")]
    UndeclaredResultType(String, String, String),
    /// An executor's declared result type is never used by any node assigned to it.
    #[error("executor '{0}' declares result type '{1}' that is used by no act")]
    UnusedDeclaredResultType(String, String),
}

// ============================================================================
// SECTION: Compilation Helpers
// ============================================================================

/// Checks that the document's initial act names a real node.
fn ensure_initial_act_exists(document: &GraphDocument) -> Result<(), GraphError> {
    if document.acts.contains_key(&document.initial_act) {
        Ok(())
    } else {
        Err(GraphError::UnknownInitialAct(document.initial_act.clone()))
    }
}

/// Compiles every node in the document, checking per-node shape invariants.
fn compile_nodes(document: &GraphDocument) -> Result<BTreeMap<String, Node>, GraphError> {
    let mut nodes = BTreeMap::new();
    for (act_name, node_doc) in &document.acts {
        if node_doc.label.trim().is_empty() {
            return Err(GraphError::EmptyLabel(act_name.clone()));
        }
        if node_doc.results.is_empty() {
            return Err(GraphError::EmptyResults(act_name.clone()));
        }

        let executor = if node_doc.executor == NO_EXECUTOR {
            None
        } else {
            Some(node_doc.executor.clone())
        };

        if executor.is_none() {
            let is_single_created = node_doc.results.len() == 1
                && node_doc.results.contains_key(CREATED_RESULT);
            if !is_single_created {
                return Err(GraphError::PhaseGroupResultShape(act_name.clone()));
            }
        }

        let mut results = BTreeMap::new();
        for (result_type, edge_docs) in &node_doc.results {
            if edge_docs.is_empty() {
                return Err(GraphError::EmptyEdgeList(act_name.clone(), result_type.clone()));
            }
            let mut edges = Vec::with_capacity(edge_docs.len());
            for edge_doc in edge_docs {
                edges.push(compile_edge(act_name, result_type, edge_doc)?);
            }
            results.insert(result_type.clone(), edges);
        }

        nodes.insert(
            act_name.clone(),
            Node {
                label: node_doc.label.clone(),
                executor,
                group: node_doc.group.clone(),
                results,
            },
        );
    }
    Ok(nodes)
}

/// Compiles one edge, normalising its container reference.
fn compile_edge(
    act_name: &str,
    result_type: &str,
    edge_doc: &EdgeDocument,
) -> Result<Edge, GraphError> {
    if edge_doc.name.trim().is_empty() {
        return Err(GraphError::EmptyOutcomeName(act_name.to_string(), result_type.to_string()));
    }
    let container = match edge_doc.container.as_deref() {
        None | Some(ISSUE_CONTAINER) => Container::Issue,
        Some(label) => Container::Group(label.to_string()),
    };
    Ok(Edge {
        name: edge_doc.name.clone(),
        container,
        next: edge_doc.next.clone(),
    })
}

/// Checks that every edge's `next` names a node in the graph.
fn ensure_next_targets_exist(nodes: &BTreeMap<String, Node>) -> Result<(), GraphError> {
    for (act_name, node) in nodes {
        for edges in node.results.values() {
            for edge in edges {
                if let Some(next) = &edge.next
                    && !nodes.contains_key(next)
                {
                    return Err(GraphError::UnknownNextAct(
                        act_name.clone(),
                        edge.name.clone(),
                        next.clone(),
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Checks that every edge's `in` names a known phase-group label.
fn ensure_container_labels_exist(nodes: &BTreeMap<String, Node>) -> Result<(), GraphError> {
    let labels: BTreeSet<&str> = nodes
        .values()
        .filter_map(|node| node.group.as_deref())
        .chain(nodes.iter().filter(|(_, node)| node.is_phase_group()).map(|(name, _)| name.as_str()))
        .collect();

    for (act_name, node) in nodes {
        for edges in node.results.values() {
            for edge in edges {
                if let Container::Group(label) = &edge.container
                    && !labels.contains(label.as_str())
                {
                    return Err(GraphError::UnknownContainer(
                        act_name.clone(),
                        edge.name.clone(),
                        label.clone(),
                    ));
                }
            }
        }
    }
    Ok(())
}

/// Checks that every edge's outcome name has a states table entry.
fn ensure_outcomes_in_states_table(
    nodes: &BTreeMap<String, Node>,
    states: &BTreeMap<String, String>,
) -> Result<(), GraphError> {
    for (act_name, node) in nodes {
        for edges in node.results.values() {
            for edge in edges {
                if !states.contains_key(&edge.name) {
                    return Err(GraphError::OutcomeNotInStatesTable(edge.name.clone(), act_name.clone()));
                }
            }
        }
    }
    Ok(())
}

/// Checks declared result types against registered executors (§4.2).
fn ensure_declared_result_types(
    nodes: &BTreeMap<String, Node>,
    executor_result_types: &BTreeMap<String, BTreeSet<String>>,
) -> Result<(), GraphError> {
    for (act_name, node) in nodes {
        let Some(executor) = &node.executor else {
            continue;
        };
        let Some(declared) = executor_result_types.get(executor) else {
            continue;
        };
        for result_type in node.results.keys() {
            if !declared.contains(result_type) {
                return Err(GraphError::UndeclaredResultType(
                    act_name.clone(),
                    result_type.clone(),
                    executor.clone(),
                ));
            }
        }
    }

    for (executor, declared) in executor_result_types {
        for result_type in declared {
            let used = nodes
                .values()
                .any(|node| node.executor.as_deref() == Some(executor.as_str()) && node.results.contains_key(result_type));
            if !used {
                return Err(GraphError::UnusedDeclaredResultType(executor.clone(), result_type.clone()));
            }
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use expect/unwrap for failure messages")]
mod tests {
    use std::collections::BTreeMap;
    use std::collections::BTreeSet;

    use super::Container;
    use super::Graph;
    use super::GraphError;
    use crate::graph::document::EdgeDocument;
    use crate::graph::document::GraphDocument;
    use crate::graph::document::NodeDocument;

    fn minimal_document() -> GraphDocument {
        let mut acts = BTreeMap::new();
        acts.insert(
            "Implement".to_string(),
            NodeDocument {
                label: "Implement".to_string(),
                executor: "implement".to_string(),
                group: Some("Build".to_string()),
                results: BTreeMap::from([(
                    "pr".to_string(),
                    vec![EdgeDocument {
                        name: "PrCreated".to_string(),
                        container: None,
                        next: None,
                    }],
                )]),
            },
        );
        acts.insert(
            "Build".to_string(),
            NodeDocument {
                label: "Build".to_string(),
                executor: "none".to_string(),
                group: None,
                results: BTreeMap::from([(
                    "created".to_string(),
                    vec![EdgeDocument {
                        name: "Building".to_string(),
                        container: Some("Build".to_string()),
                        next: Some("Implement".to_string()),
                    }],
                )]),
            },
        );
        let states = BTreeMap::from([
            ("Building".to_string(), "inProgress".to_string()),
            ("PrCreated".to_string(), "inReview".to_string()),
        ]);
        GraphDocument {
            acts,
            states,
            initial_act: "Build".to_string(),
        }
    }

    #[test]
    fn compiles_a_minimal_valid_document() {
        let document = minimal_document();
        let graph = Graph::compile(&document, &BTreeMap::new()).expect("graph should compile");
        assert_eq!(graph.initial_act(), "Build");
        let node = graph.node("Build").expect("Build node present");
        assert!(node.is_phase_group());
    }

    #[test]
    fn rejects_unknown_initial_act() {
        let mut document = minimal_document();
        document.initial_act = "Nope".to_string();
        let err = Graph::compile(&document, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, GraphError::UnknownInitialAct(_)));
    }

    #[test]
    fn rejects_outcome_missing_from_states_table() {
        let mut document = minimal_document();
        document.states.remove("PrCreated");
        let err = Graph::compile(&document, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, GraphError::OutcomeNotInStatesTable(_, _)));
    }

    #[test]
    fn rejects_next_act_that_does_not_exist() {
        let mut document = minimal_document();
        if let Some(node) = document.acts.get_mut("Build") {
            node.results.get_mut("created").expect("created result").get_mut(0).expect("edge").next =
                Some("Missing".to_string());
        }
        let err = Graph::compile(&document, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, GraphError::UnknownNextAct(_, _, _)));
    }

    #[test]
    fn resolves_group_container_for_edges() {
        let document = minimal_document();
        let graph = Graph::compile(&document, &BTreeMap::new()).expect("graph should compile");
        let node = graph.node("Build").expect("Build node present");
        let edges = node.results.get("created").expect("created result");
        assert_eq!(edges[0].container, Container::Group("Build".to_string()));
    }

    #[test]
    fn enforces_declared_result_type_subset() {
        let document = minimal_document();
        let mut declared = BTreeMap::new();
        declared.insert("implement".to_string(), BTreeSet::from(["wrong_type".to_string()]));
        let err = Graph::compile(&document, &declared).unwrap_err();
        assert!(matches!(err, GraphError::UndeclaredResultType(_, _, _)));
    }
}
