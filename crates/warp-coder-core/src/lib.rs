// warp-coder-core/src/lib.rs
// ============================================================================
// Module: Warp Coder Core Library
// Description: Public API surface for the Warp Coder orchestration core.
// Purpose: Expose graph schema, durable entities, and the executor contract.
// Dependencies: crate::{names, ids, time, graph, entities, executor}
// ============================================================================

//! ## Overview
//! Warp Coder core provides the graph-driven state machine that interprets a
//! declarative workflow and the durable entity/event model that the scheduler
//! projects run state from. It is backend-agnostic: the ledger, board, and
//! code-host are consumed through traits defined in `warp-coder-adapters` and
//! `warp-coder-ledger`, not embedded here.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod entities;
pub mod executor;
pub mod graph;
pub mod ids;
pub mod names;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use entities::Act;
pub use entities::IssueRun;
pub use entities::Outcome;
pub use entities::PendingAct;
pub use entities::PhaseGroup;
pub use entities::PipelineRun;
pub use executor::Context;
pub use executor::ExecutorError;
pub use executor::ExecutorRegistry;
pub use executor::ExecutorResult;
pub use executor::ResultType;
pub use executor::WorkflowExecutor;
pub use graph::Graph;
pub use graph::GraphError;
pub use graph::analysis::GraphAnalysis;
pub use graph::analysis::RetryTarget;
pub use graph::analysis::TransitionEdge;
pub use graph::analysis::topo_sort;
pub use graph::document::GraphDocument;
pub use ids::ActId;
pub use ids::IdKind;
pub use ids::IssueId;
pub use ids::IssueRunId;
pub use ids::OutcomeId;
pub use ids::PhaseGroupId;
pub use ids::PipelineRunId;
pub use ids::timestamp_of;
pub use names::ActName;
pub use names::Classification;
pub use names::OutcomeName;
pub use time::Timestamp;
