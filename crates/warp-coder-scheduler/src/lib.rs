// warp-coder-scheduler/src/lib.rs
// ============================================================================
// Module: Warp Coder Scheduler Library
// Description: Public API surface for the poll-loop scheduler.
// Purpose: Expose the effect registry, scheduler error type, per-run
//          advancement function, the scheduler itself, and shutdown-signal
//          wiring to the binary crate.
// Dependencies: crate::{effects, error, process_run, scheduler, shutdown}
// ============================================================================

//! ## Overview
//! This crate owns the long-lived poll loop (§4.6): discover open runs,
//! intake new issues, reconcile terminal board columns, retry blocked runs,
//! and advance every run with a pending act one `processRun` call at a time.
//! It depends on `warp-coder-core` for the compiled graph and executor/
//! context-provider registries, `warp-coder-adapters` for the board contract,
//! and `warp-coder-ledger` for the durable state store; it has no opinion on
//! which concrete board, executors, or ledger deployment are wired in.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod effects;
pub mod error;
pub mod process_run;
pub mod scheduler;
pub mod shutdown;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use effects::Effect;
pub use effects::EffectRegistry;
pub use effects::ErrorCommentEffect;
pub use effects::QuestionCommentEffect;
pub use effects::default_effects;
pub use error::SchedulerError;
pub use process_run::process_run;
pub use scheduler::Scheduler;
pub use shutdown::install as install_shutdown_watch;
