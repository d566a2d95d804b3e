// warp-coder-adapters/src/issues.rs
// ============================================================================
// Module: Issues Client
// Description: Contract for reading an issue's body and comment thread.
// Purpose: Let executors detect clarification replies without depending on a
//          concrete issue-tracker API.
// Dependencies: async_trait, thiserror
// ============================================================================

//! ## Overview
//! Executors that wait on a human reply (AwaitReply) poll
//! [`IssuesClient::get_issue_comments`] to find the last non-bot message and
//! decide whether the user has replied since a clarification comment was
//! posted. The well-known question marker is [`QUESTION_MARKER`] (§4.7).

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use thiserror::Error;

// ============================================================================
// SECTION: Public Types
// ============================================================================

/// HTML comment marker identifying a clarification-request comment.
pub const QUESTION_MARKER: &str = "<!-- warp-coder:question -->";

/// One comment on an issue thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueComment {
    /// Opaque comment identifier.
    pub id: String,
    /// Login of the comment's author.
    pub author: String,
    /// `true` if the author is the bot identity posting on behalf of the daemon.
    pub is_bot: bool,
    /// Comment body, verbatim.
    pub body: String,
    /// Unix millis the comment was posted at.
    pub posted_at_ms: i64,
}

impl IssueComment {
    /// Returns `true` if this comment carries the clarification-question marker.
    #[must_use]
    pub fn is_question(&self) -> bool {
        self.is_bot && self.body.contains(QUESTION_MARKER)
    }
}

/// Issues client failures.
#[derive(Debug, Error)]
pub enum IssuesError {
    /// The issue tracker is unreachable or returned a server error.
    #[error("issues client unavailable: {0}")]
    Unavailable(String),
    /// The issue tracker rejected the request (e.g. unknown issue).
    #[error("issues client rejected request: {0}")]
    Rejected(String),
}

// ============================================================================
// SECTION: Issues Client
// ============================================================================

/// Thin, contract-only interface onto an issue tracker's read API (§4.7).
#[async_trait]
pub trait IssuesClient: Send + Sync {
    /// Returns an issue's current body text.
    ///
    /// # Errors
    ///
    /// Returns [`IssuesError`] when the issue cannot be read.
    async fn get_issue_body(&self, repo: &str, issue_number: u64) -> Result<String, IssuesError>;

    /// Returns an issue's comment thread, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`IssuesError`] when the issue cannot be read.
    async fn get_issue_comments(&self, repo: &str, issue_number: u64) -> Result<Vec<IssueComment>, IssuesError>;
}

/// Returns the most recent comment not authored by the bot identity, if any.
#[must_use]
pub fn last_non_bot_comment(comments: &[IssueComment]) -> Option<&IssueComment> {
    comments.iter().rev().find(|comment| !comment.is_bot)
}

/// Returns `true` if a non-bot comment was posted after the most recent
/// clarification-question comment.
#[must_use]
pub fn has_reply_since_question(comments: &[IssueComment]) -> bool {
    let Some(question_index) = comments.iter().rposition(IssueComment::is_question) else {
        return false;
    };
    comments[question_index + 1..].iter().any(|comment| !comment.is_bot)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use expect/unwrap for failure messages")]
mod tests {
    use super::IssueComment;
    use super::QUESTION_MARKER;
    use super::has_reply_since_question;
    use super::last_non_bot_comment;

    fn comment(id: &str, author: &str, is_bot: bool, body: &str) -> IssueComment {
        IssueComment {
            id: id.to_string(),
            author: author.to_string(),
            is_bot,
            body: body.to_string(),
            posted_at_ms: 0,
        }
    }

    #[test]
    fn is_question_requires_bot_and_marker() {
        let question = comment("1", "warp-coder[bot]", true, &format!("Please clarify X.\n{QUESTION_MARKER}"));
        assert!(question.is_question());
        let human = comment("2", "alice", false, QUESTION_MARKER);
        assert!(!human.is_question());
    }

    #[test]
    fn last_non_bot_comment_skips_trailing_bot_comments() {
        let comments = vec![
            comment("1", "alice", false, "here's context"),
            comment("2", "warp-coder[bot]", true, "working on it"),
        ];
        let found = last_non_bot_comment(&comments).expect("alice's comment");
        assert_eq!(found.id, "1");
    }

    #[test]
    fn has_reply_since_question_detects_a_human_reply_after_the_marker() {
        let comments = vec![
            comment("1", "warp-coder[bot]", true, QUESTION_MARKER),
            comment("2", "alice", false, "here's the answer"),
        ];
        assert!(has_reply_since_question(&comments));
    }

    #[test]
    fn has_reply_since_question_false_when_no_reply_follows() {
        let comments = vec![comment("1", "warp-coder[bot]", true, QUESTION_MARKER)];
        assert!(!has_reply_since_question(&comments));
    }

    #[test]
    fn has_reply_since_question_false_when_no_question_posted() {
        let comments = vec![comment("1", "alice", false, "just chatting")];
        assert!(!has_reply_since_question(&comments));
    }
}
