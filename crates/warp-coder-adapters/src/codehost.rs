// warp-coder-adapters/src/codehost.rs
// ============================================================================
// Module: Code-Host Adapter (PR Client)
// Description: Contract for the pull-request and review integration.
// Purpose: Let executors discover, review, and merge pull requests without
//          depending on a concrete code-host API.
// Dependencies: async_trait, thiserror
// ============================================================================

//! ## Overview
//! Executors such as Review and Merge call through [`CodeHostAdapter`] to
//! discover the open PR for an issue, submit reviews, and merge. The
//! scheduler clears the adapter's per-poll cache at the top of every cycle
//! (§5). The concrete code-host integration is out of scope (spec §1, §4.7).

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// SECTION: Public Types
// ============================================================================

/// A pull request's lifecycle state, as last observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrState {
    /// Open and awaiting review or changes.
    Open,
    /// Closed without merging.
    Closed,
    /// Merged into its base branch.
    Merged,
}

/// A review event to submit against a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReviewEvent {
    /// Approve the pull request.
    Approve,
    /// Request changes before merging.
    RequestChanges,
    /// Leave a comment without approving or requesting changes.
    Comment,
}

/// A single inline or top-level review comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewComment {
    /// File path the comment is anchored to, or `None` for a top-level comment.
    pub path: Option<String>,
    /// Line number the comment is anchored to, meaningful only with `path`.
    pub line: Option<u32>,
    /// Comment body.
    pub body: String,
}

/// A review submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSubmission {
    /// The review event.
    pub event: ReviewEvent,
    /// Top-level review body.
    pub body: String,
    /// Inline comments accompanying the review.
    pub comments: Vec<ReviewComment>,
}

/// One changed file in a pull request's diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrFile {
    /// Repository-relative path.
    pub path: String,
    /// Lines added.
    pub additions: u32,
    /// Lines removed.
    pub deletions: u32,
}

/// One commit on a pull request's branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrCommit {
    /// Commit SHA.
    pub sha: String,
    /// Commit message subject line.
    pub message: String,
}

/// Code-host adapter failures.
#[derive(Debug, Error)]
pub enum CodeHostError {
    /// The code-host integration is unreachable or returned a server error.
    #[error("code host unavailable: {0}")]
    Unavailable(String),
    /// The code-host rejected the request (e.g. unknown PR, merge conflict).
    #[error("code host rejected request: {0}")]
    Rejected(String),
}

// ============================================================================
// SECTION: Code-Host Adapter
// ============================================================================

/// Thin, contract-only interface onto a code-host's pull-request API (§4.7).
#[async_trait]
pub trait CodeHostAdapter: Send + Sync {
    /// Finds the open pull request number for an issue, matching branches
    /// against the configured naming pattern.
    ///
    /// # Errors
    ///
    /// Returns [`CodeHostError`] when the code-host cannot be queried.
    async fn find_open_pr(&self, repo: &str, issue_number: u64) -> Result<Option<u64>, CodeHostError>;

    /// Submits a review against a pull request.
    ///
    /// # Errors
    ///
    /// Returns [`CodeHostError`] when the submission fails.
    async fn submit_review(
        &self,
        repo: &str,
        pr_number: u64,
        submission: &ReviewSubmission,
    ) -> Result<(), CodeHostError>;

    /// Merges a pull request.
    ///
    /// # Errors
    ///
    /// Returns [`CodeHostError`] when the merge fails.
    async fn merge_pr(&self, repo: &str, pr_number: u64) -> Result<(), CodeHostError>;

    /// Returns a pull request's lifecycle state.
    ///
    /// # Errors
    ///
    /// Returns [`CodeHostError`] when the code-host cannot be queried.
    async fn get_pr_state(&self, repo: &str, pr_number: u64) -> Result<PrState, CodeHostError>;

    /// Returns the files changed by a pull request.
    ///
    /// # Errors
    ///
    /// Returns [`CodeHostError`] when the code-host cannot be queried.
    async fn get_pr_files(&self, repo: &str, pr_number: u64) -> Result<Vec<PrFile>, CodeHostError>;

    /// Returns the commits on a pull request's branch.
    ///
    /// # Errors
    ///
    /// Returns [`CodeHostError`] when the code-host cannot be queried.
    async fn get_pr_commits(&self, repo: &str, pr_number: u64) -> Result<Vec<PrCommit>, CodeHostError>;

    /// Returns a pull request's source branch name.
    ///
    /// # Errors
    ///
    /// Returns [`CodeHostError`] when the code-host cannot be queried.
    async fn get_pr_branch(&self, repo: &str, pr_number: u64) -> Result<String, CodeHostError>;

    /// Clears the per-poll cache backing the above lookups.
    fn clear_cache(&self);
}
