// warp-coder-adapters/src/notify.rs
// ============================================================================
// Module: Notify Client
// Description: Contract for posting formatted comments back onto an issue.
// Purpose: Let effects notify users without depending on a concrete
//          code-host comment API.
// Dependencies: async_trait, thiserror, warp_coder_core
// ============================================================================

//! ## Overview
//! Effects (§4.6 step 7) call [`NotifyClient::comment`] to post a formatted
//! comment, optionally carrying a run-URL header pointing back at the
//! ledger's record of the pipeline run that produced it (§4.7).

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use thiserror::Error;
use warp_coder_core::IssueId;
use warp_coder_core::PipelineRunId;

// ============================================================================
// SECTION: Public Types
// ============================================================================

/// A formatted comment to post onto an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyMessage {
    /// Repository the issue belongs to.
    pub repo: String,
    /// Pipeline run this notification is attached to, if any.
    pub run_id: Option<PipelineRunId>,
    /// Optional comment title, rendered as a heading.
    pub title: Option<String>,
    /// Comment body.
    pub body: String,
}

/// Notify client failures.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The notification target is unreachable or returned a server error.
    #[error("notify client unavailable: {0}")]
    Unavailable(String),
    /// The notification target rejected the request.
    #[error("notify client rejected request: {0}")]
    Rejected(String),
}

// ============================================================================
// SECTION: Notify Client
// ============================================================================

/// Thin, contract-only interface for posting comments back onto an issue (§4.7).
#[async_trait]
pub trait NotifyClient: Send + Sync {
    /// Posts a formatted comment onto an issue.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when the comment cannot be posted.
    async fn comment(&self, issue_id: &IssueId, message: &NotifyMessage) -> Result<(), NotifyError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use expect/unwrap for failure messages")]
mod tests {
    use super::NotifyMessage;

    #[test]
    fn notify_message_carries_optional_title_and_run_id() {
        let message = NotifyMessage {
            repo: "acme/widgets".to_string(),
            run_id: None,
            title: Some("Build failed".to_string()),
            body: "see logs".to_string(),
        };
        assert_eq!(message.title.as_deref(), Some("Build failed"));
        assert!(message.run_id.is_none());
    }
}
