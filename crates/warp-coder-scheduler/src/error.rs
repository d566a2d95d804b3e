// warp-coder-scheduler/src/error.rs
// ============================================================================
// Module: Scheduler Errors
// Description: Failure kinds the poll loop and processRun can surface.
// Purpose: Distinguish a graph violation (halts one run for this cycle) from
//          a transient adapter failure (retried next poll).
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Almost nothing here is fatal to the scheduler itself (§7): every variant
//! is logged and the offending run is simply left for the next poll to
//! re-observe. [`SchedulerError`] exists so call sites can log with the
//! right severity, not so callers branch on it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Scheduler Error
// ============================================================================

/// A failure encountered advancing one run, or the poll cycle itself.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The ledger could not be reached or rejected a request.
    #[error("ledger failure: {0}")]
    Ledger(#[from] warp_coder_ledger::LedgerError),
    /// The board could not be reached or rejected a request.
    #[error("board failure: {0}")]
    Board(#[from] warp_coder_adapters::BoardError),
    /// A registered context provider failed.
    #[error("context provider failure: {0}")]
    ContextProvider(#[from] warp_coder_adapters::ContextProviderError),
    /// A graph-soundness violation: undeclared result type, unknown
    /// executor, or a result type with no edges (§4.2, §7 GraphViolation).
    #[error("graph violation advancing act '{0}': {1}")]
    GraphViolation(String, String),
    /// The ledger batch worker thread panicked or was dropped.
    #[error("ledger batch task failed: {0}")]
    BatchTaskFailed(String),
}
