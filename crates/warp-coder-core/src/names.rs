// warp-coder-core/src/names.rs
// ============================================================================
// Module: Warp Coder Built-in Names
// Description: Canonical act names, outcome names, and classifications.
// Purpose: Centralize the stable vocabulary used by the shipped default graph.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The graph engine itself (see [`crate::graph`]) treats act and outcome names
//! as opaque strings resolved at load time, because a workflow graph is
//! user-supplied data (see Design Notes in `SPEC_FULL.md`). This module holds
//! the *built-in* vocabulary: the small, stable set of act and outcome names
//! used by the shipped default workflow (`warp-coder-builtins`) and the
//! classification values registered with the ledger at startup.
//!
//! These are data, not code: an implementation publishes outcome
//! classifications through an idempotent "upsert classification" call against
//! the ledger at startup (see `warp-coder-ledger::LedgerClient::
//! register_classifications`).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Act Names
// ============================================================================

/// Canonical built-in act names used by the shipped default workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ActName {
    /// Opens the implementation phase group.
    Build,
    /// Invokes the coder to implement the issue.
    Implement,
    /// Waits for the user to reply to a clarification request.
    AwaitReply,
    /// Requests a review of the opened pull request.
    Review,
    /// Evaluates review feedback before deciding to revise or merge.
    Evaluate,
    /// Invokes the coder to apply requested changes.
    Revise,
    /// Merges the pull request.
    Merge,
    /// Opens the deploy phase group.
    Deploy,
    /// Waits for a deploy batch to become runnable.
    AwaitDeploy,
    /// Runs the deploy step for a batch.
    RunDeploy,
    /// Opens the release phase group.
    Release,
    /// Publishes the release.
    Publish,
}

impl ActName {
    /// Returns the canonical string form of the act name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Build => "Build",
            Self::Implement => "Implement",
            Self::AwaitReply => "AwaitReply",
            Self::Review => "Review",
            Self::Evaluate => "Evaluate",
            Self::Revise => "Revise",
            Self::Merge => "Merge",
            Self::Deploy => "Deploy",
            Self::AwaitDeploy => "AwaitDeploy",
            Self::RunDeploy => "RunDeploy",
            Self::Release => "Release",
            Self::Publish => "Publish",
        }
    }

    /// All built-in act names, in the order the shipped default graph uses them.
    #[must_use]
    pub const fn all() -> [Self; 12] {
        [
            Self::Build,
            Self::Implement,
            Self::AwaitReply,
            Self::Review,
            Self::Evaluate,
            Self::Revise,
            Self::Merge,
            Self::Deploy,
            Self::AwaitDeploy,
            Self::RunDeploy,
            Self::Release,
            Self::Publish,
        ]
    }
}

impl fmt::Display for ActName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Outcome Names
// ============================================================================

/// Canonical built-in outcome names used by the shipped default workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum OutcomeName {
    /// A pull request was opened.
    PrCreated,
    /// Fixes were applied to an open pull request.
    FixesApplied,
    /// The pull request was merged.
    Merged,
    /// The coder requested clarification from the user.
    NeedsClarification,
    /// The coder reported it could not implement the issue.
    ImplementationFailed,
    /// The revision retry cap was reached.
    MaxRetries,
    /// A run started.
    Started,
    /// A run resumed after being blocked.
    Resumed,
    /// A run was aborted from the board.
    Aborted,
    /// A review approved the pull request.
    Approved,
    /// A review requested changes.
    ChangesRequested,
    /// A deploy completed.
    Deployed,
    /// A release completed.
    Released,
    /// A release failed.
    ReleaseFailed,
    /// The user replied after a clarification request.
    Clarified,
    /// A coder invocation paused on the max-turns budget.
    Paused,
    /// A run was closed by moving its card to a manual-release column.
    ManualRelease,
    /// A merge attempt failed.
    MergeFailed,
    /// A run is awaiting its deploy batch.
    AwaitingDeploy,
    /// A phase group (or the issue run it mirrors onto) was opened.
    Building,
    /// A review was requested.
    Reviewing,
}

impl OutcomeName {
    /// Returns the canonical string form of the outcome name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PrCreated => "PrCreated",
            Self::FixesApplied => "FixesApplied",
            Self::Merged => "Merged",
            Self::NeedsClarification => "NeedsClarification",
            Self::ImplementationFailed => "ImplementationFailed",
            Self::MaxRetries => "MaxRetries",
            Self::Started => "Started",
            Self::Resumed => "Resumed",
            Self::Aborted => "Aborted",
            Self::Approved => "Approved",
            Self::ChangesRequested => "ChangesRequested",
            Self::Deployed => "Deployed",
            Self::Released => "Released",
            Self::ReleaseFailed => "RELEASE_FAILED",
            Self::Clarified => "Clarified",
            Self::Paused => "Paused",
            Self::ManualRelease => "ManualRelease",
            Self::MergeFailed => "MergeFailed",
            Self::AwaitingDeploy => "AwaitingDeploy",
            Self::Building => "Building",
            Self::Reviewing => "Reviewing",
        }
    }

    /// The classification registered for this outcome with the ledger.
    #[must_use]
    pub const fn classification(self) -> Classification {
        match self {
            Self::PrCreated
            | Self::Merged
            | Self::Approved
            | Self::Deployed
            | Self::Released
            | Self::Clarified
            | Self::FixesApplied
            | Self::Building
            | Self::Reviewing
            | Self::AwaitingDeploy => Classification::Success,
            Self::Started | Self::Resumed | Self::Paused => Classification::Neutral,
            Self::NeedsClarification
            | Self::ImplementationFailed
            | Self::MaxRetries
            | Self::Aborted
            | Self::ChangesRequested
            | Self::ReleaseFailed
            | Self::ManualRelease
            | Self::MergeFailed => Classification::Failure,
        }
    }

    /// All built-in outcome names.
    #[must_use]
    pub const fn all() -> [Self; 21] {
        [
            Self::PrCreated,
            Self::FixesApplied,
            Self::Merged,
            Self::NeedsClarification,
            Self::ImplementationFailed,
            Self::MaxRetries,
            Self::Started,
            Self::Resumed,
            Self::Aborted,
            Self::Approved,
            Self::ChangesRequested,
            Self::Deployed,
            Self::Released,
            Self::ReleaseFailed,
            Self::Clarified,
            Self::Paused,
            Self::ManualRelease,
            Self::MergeFailed,
            Self::AwaitingDeploy,
            Self::Building,
            Self::Reviewing,
        ]
    }
}

impl fmt::Display for OutcomeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Outcome classification registered once with the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// A successful transition.
    Success,
    /// A neutral, informational transition.
    Neutral,
    /// A failed transition.
    Failure,
}

impl Classification {
    /// Returns the canonical string form of the classification.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Neutral => "neutral",
            Self::Failure => "failure",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Classification;
    use super::OutcomeName;

    #[test]
    fn every_outcome_name_has_a_classification() {
        for outcome in OutcomeName::all() {
            let classification = outcome.classification();
            assert!(matches!(
                classification,
                Classification::Success | Classification::Neutral | Classification::Failure
            ));
        }
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(OutcomeName::PrCreated.to_string(), "PrCreated");
        assert_eq!(OutcomeName::ReleaseFailed.to_string(), "RELEASE_FAILED");
    }
}
