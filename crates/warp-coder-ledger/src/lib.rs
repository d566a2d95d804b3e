// warp-coder-ledger/src/lib.rs
// ============================================================================
// Module: Warp Coder Ledger Library
// Description: Public API surface for the ledger client.
// Purpose: Expose the batching event client and its wire protocol types.
// Dependencies: crate::{client, error, wire}
// ============================================================================

//! ## Overview
//! Warp Coder treats the ledger as its only durable state store: every
//! transition is recorded as an append-only event, and the scheduler
//! rediscovers pending work by querying the same event log rather than
//! holding state in process memory (§3, §4.4).

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod error;
pub mod wire;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::ActSummary;
pub use client::LedgerBatch;
pub use client::LedgerClient;
pub use client::OpenIssueRun;
pub use error::LedgerError;
pub use wire::ActRecord;
pub use wire::CallRecord;
pub use wire::EventBatch;
pub use wire::EventEnvelope;
pub use wire::GroupRecord;
pub use wire::LinkRecord;
pub use wire::OutcomeRecord;
pub use wire::RunRecord;
