// warp-coder-adapters/src/lib.rs
// ============================================================================
// Module: Warp Coder Adapters Library
// Description: Public API surface for the interface-only adapter contracts.
// Purpose: Expose the board, code-host, issues, notify, git, coder, and
//          context-provider traits consumed by executors and the scheduler.
// Dependencies: crate::{board, codehost, coder, context, git, issues, notify}
// ============================================================================

//! ## Overview
//! Every trait in this crate is contract-only: none of them has a concrete
//! implementation here. The concrete project-tracking, code-host, and `git`
//! integrations, and the coder subprocess protocol itself, are treated as
//! external collaborators (§1, §4.7) — only their contracts are specified.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod board;
pub mod coder;
pub mod codehost;
pub mod context;
pub mod git;
pub mod issues;
pub mod notify;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use board::BoardAdapter;
pub use board::BoardColumn;
pub use board::BoardError;
pub use board::BoardItem;
pub use coder::CoderClient;
pub use coder::CoderEnvelope;
pub use coder::CoderError;
pub use coder::CoderEvent;
pub use coder::CompletionSubtype;
pub use coder::RunOptions;
pub use codehost::CodeHostAdapter;
pub use codehost::CodeHostError;
pub use codehost::PrCommit;
pub use codehost::PrFile;
pub use codehost::PrState;
pub use codehost::ReviewComment;
pub use codehost::ReviewEvent;
pub use codehost::ReviewSubmission;
pub use context::ContextProvider;
pub use context::ContextProviderError;
pub use context::ContextProviderRegistry;
pub use git::GitClient;
pub use git::GitError;
pub use git::GitStatus;
pub use issues::IssueComment;
pub use issues::IssuesClient;
pub use issues::IssuesError;
pub use notify::NotifyClient;
pub use notify::NotifyError;
pub use notify::NotifyMessage;
