// warp-coder-core/src/graph/document.rs
// ============================================================================
// Module: Workflow Graph Document
// Description: Untrusted wire format for a workflow graph, parsed once.
// Purpose: Give serde a flat, string-keyed shape to deserialize before the
//          graph is compiled and cross-checked by `graph::compile`.
// Dependencies: serde, serde_json, std::collections::BTreeMap
// ============================================================================

//! ## Overview
//! A workflow graph is user-supplied data: the shipped default or an override
//! file read from the config directory. [`GraphDocument`] is the shape serde
//! deserializes directly; it is intentionally permissive (string keys,
//! optional fields) because validation happens once, explicitly, in
//! [`crate::graph::Graph::compile`] rather than through serde error messages.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Document
// ============================================================================

/// The reserved container label meaning "the issue run itself".
pub const ISSUE_CONTAINER: &str = "Issue";

/// Sentinel executor reference marking a phase-group node.
pub const NO_EXECUTOR: &str = "none";

/// The single result-type name a phase-group node's result must carry.
pub const CREATED_RESULT: &str = "created";

/// Raw workflow document: graph nodes plus the board states table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Ordered mapping from act name to node definition.
    pub acts: BTreeMap<String, NodeDocument>,
    /// Mapping from outcome name to symbolic board column.
    pub states: BTreeMap<String, String>,
    /// The act name the graph starts advancing from.
    pub initial_act: String,
}

/// Raw node definition as it appears in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDocument {
    /// Human-readable label shown in logs and diagnostics.
    pub label: String,
    /// Executor name, or `"none"` for a phase-group node.
    pub executor: String,
    /// Parent phase-group label, if any.
    #[serde(default)]
    pub group: Option<String>,
    /// Mapping from result-type name to its edge sequence.
    pub results: BTreeMap<String, Vec<EdgeDocument>>,
}

/// Raw edge definition as it appears in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDocument {
    /// Outcome name recorded on the resolved container.
    pub name: String,
    /// Container the outcome is recorded on: absent, `"Issue"`, or a label.
    #[serde(default, rename = "in")]
    pub container: Option<String>,
    /// The act this edge emits, if any.
    #[serde(default)]
    pub next: Option<String>,
}
