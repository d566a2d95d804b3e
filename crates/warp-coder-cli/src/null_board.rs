// warp-coder-cli/src/null_board.rs
// ============================================================================
// Module: Null Board Adapter
// Description: A BoardAdapter backed by no real project-tracking board.
// Purpose: Let `watch` and `debug` drive the real Scheduler/processRun
//          without a concrete board integration (out of scope, §1, §4.7):
//          every scan surfaces nothing and every sync silently succeeds.
// Dependencies: async_trait, warp_coder_adapters, warp_coder_core
// ============================================================================

use std::collections::BTreeSet;

use async_trait::async_trait;
use warp_coder_adapters::BoardAdapter;
use warp_coder_adapters::BoardColumn;
use warp_coder_adapters::BoardError;
use warp_coder_adapters::BoardItem;
use warp_coder_core::IssueId;

/// A board adapter with nothing behind it.
#[derive(Debug, Default)]
pub struct NullBoardAdapter;

#[async_trait]
impl BoardAdapter for NullBoardAdapter {
    async fn scan_new_issues(&self) -> Result<Vec<BoardItem>, BoardError> {
        Ok(Vec::new())
    }

    async fn get_all_items(&self) -> Result<Vec<BoardItem>, BoardError> {
        Ok(Vec::new())
    }

    async fn scan_aborted(&self) -> Result<BTreeSet<IssueId>, BoardError> {
        Ok(BTreeSet::new())
    }

    async fn scan_done(&self) -> Result<BTreeSet<IssueId>, BoardError> {
        Ok(BTreeSet::new())
    }

    async fn scan_blocked(&self) -> Result<BTreeSet<IssueId>, BoardError> {
        Ok(BTreeSet::new())
    }

    async fn sync_state(&self, _item: &BoardItem, _column: BoardColumn) -> Result<(), BoardError> {
        Ok(())
    }
}
