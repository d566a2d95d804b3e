// warp-coder-adapters/src/board.rs
// ============================================================================
// Module: Board Adapter
// Description: Contract for the project-tracking board integration.
// Purpose: Let the scheduler discover new issues, terminal column moves, and
//          sync an issue's column without depending on a concrete board API.
// Dependencies: async_trait, warp_coder_core, thiserror
// ============================================================================

//! ## Overview
//! The scheduler calls [`BoardAdapter`] once per poll cycle to discover
//! intake candidates and terminal column moves, and fire-and-forget at the
//! end of `processRun` to mirror the latest outcome onto the board. This
//! crate defines the contract only; the concrete project-tracking
//! integration is out of scope (spec §1, §4.7).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use async_trait::async_trait;
use thiserror::Error;
use warp_coder_core::IssueId;

// ============================================================================
// SECTION: Public Types
// ============================================================================

/// A board-tracked item, carrying the underlying issue's identifying fields
/// as synced onto the board (e.g. a GitHub Projects item mirrors its issue's
/// number, repo, and title) plus an opaque handle to address it again.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoardItem {
    /// The board's issue identifier.
    pub issue_id: IssueId,
    /// The underlying issue's number.
    pub issue_number: u64,
    /// The repository the issue belongs to.
    pub repo: String,
    /// The issue title, as last synced onto the board.
    pub title: String,
    /// Opaque handle the concrete adapter needs to address this item again.
    pub handle: String,
}

/// A symbolic board column, as named in the states table (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BoardColumn {
    /// Not yet started.
    Todo,
    /// A work act is in flight.
    InProgress,
    /// Awaiting human review.
    InReview,
    /// Merged and staged for deployment.
    ReadyForDeploy,
    /// Deployment in progress.
    Deploy,
    /// Blocked, awaiting a user to resolve a clarification or failure.
    Blocked,
    /// Waiting on an external event (e.g. CI, a reply).
    Waiting,
    /// Closed.
    Done,
}

impl BoardColumn {
    /// Parses a states-table symbol (e.g. `"inProgress"`) into a column.
    ///
    /// Returns `None` for an unrecognized symbol; the scheduler treats that
    /// as a poll-cycle error rather than guessing a column.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "todo" => Some(Self::Todo),
            "inProgress" => Some(Self::InProgress),
            "inReview" => Some(Self::InReview),
            "readyForDeploy" => Some(Self::ReadyForDeploy),
            "deploy" => Some(Self::Deploy),
            "blocked" => Some(Self::Blocked),
            "waiting" => Some(Self::Waiting),
            "done" => Some(Self::Done),
            _ => None,
        }
    }
}

/// Board adapter failures.
#[derive(Debug, Error)]
pub enum BoardError {
    /// The board integration is unreachable or returned a server error.
    #[error("board unavailable: {0}")]
    Unavailable(String),
    /// The board rejected the request (e.g. unknown item, bad column).
    #[error("board rejected request: {0}")]
    Rejected(String),
}

// ============================================================================
// SECTION: Board Adapter
// ============================================================================

/// Thin, contract-only interface onto a project-tracking board (§4.7).
#[async_trait]
pub trait BoardAdapter: Send + Sync {
    /// Returns issues currently sitting in the initial (intake) column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the board cannot be queried.
    async fn scan_new_issues(&self) -> Result<Vec<BoardItem>, BoardError>;

    /// Returns a full snapshot of every tracked item, refreshed once per poll.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the board cannot be queried.
    async fn get_all_items(&self) -> Result<Vec<BoardItem>, BoardError>;

    /// Returns the set of issue ids currently in the Aborted column, if the
    /// board exposes one.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the board cannot be queried.
    async fn scan_aborted(&self) -> Result<BTreeSet<IssueId>, BoardError>;

    /// Returns the set of issue ids currently in a Done column treated as
    /// manual release, if the board exposes one.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the board cannot be queried.
    async fn scan_done(&self) -> Result<BTreeSet<IssueId>, BoardError>;

    /// Returns the set of issue ids currently in the Blocked column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the board cannot be queried.
    async fn scan_blocked(&self) -> Result<BTreeSet<IssueId>, BoardError>;

    /// Moves a board item to the given column.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError`] when the move fails.
    async fn sync_state(&self, item: &BoardItem, column: BoardColumn) -> Result<(), BoardError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use expect/unwrap for failure messages")]
mod tests {
    use super::BoardColumn;
    use super::BoardItem;

    #[test]
    fn board_item_carries_issue_id_and_handle() {
        let item = BoardItem {
            issue_id: warp_coder_core::IssueId::new("issue-1"),
            issue_number: 42,
            repo: "acme/widgets".to_string(),
            title: "Fix the widget".to_string(),
            handle: "item-123".to_string(),
        };
        assert_eq!(item.handle, "item-123");
        assert_eq!(item.issue_id.as_str(), "issue-1");
        assert_eq!(item.issue_number, 42);
    }

    #[test]
    fn board_columns_are_distinguishable() {
        assert_ne!(BoardColumn::Todo, BoardColumn::Done);
    }

    #[test]
    fn from_symbol_round_trips_every_states_table_symbol() {
        assert_eq!(BoardColumn::from_symbol("todo"), Some(BoardColumn::Todo));
        assert_eq!(BoardColumn::from_symbol("inProgress"), Some(BoardColumn::InProgress));
        assert_eq!(BoardColumn::from_symbol("inReview"), Some(BoardColumn::InReview));
        assert_eq!(BoardColumn::from_symbol("readyForDeploy"), Some(BoardColumn::ReadyForDeploy));
        assert_eq!(BoardColumn::from_symbol("deploy"), Some(BoardColumn::Deploy));
        assert_eq!(BoardColumn::from_symbol("blocked"), Some(BoardColumn::Blocked));
        assert_eq!(BoardColumn::from_symbol("waiting"), Some(BoardColumn::Waiting));
        assert_eq!(BoardColumn::from_symbol("done"), Some(BoardColumn::Done));
        assert_eq!(BoardColumn::from_symbol("nonsense"), None);
    }
}
