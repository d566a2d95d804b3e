// warp-coder-ledger/src/error.rs
// ============================================================================
// Module: Ledger Client Errors
// Description: The two-kind failure model every ledger method fails with.
// Purpose: Let the scheduler distinguish transient from rejected failures
//          without inspecting HTTP status codes itself.
// Dependencies: reqwest, thiserror
// ============================================================================

//! ## Overview
//! Every [`crate::client::LedgerClient`] method either returns normally or
//! fails with one of two kinds (§4.4): a network/5xx failure the scheduler
//! should retry at the next poll, or a 4xx rejection treated as a definite
//! signal. Neither variant carries the original response body verbatim;
//! callers that need detail should consult logs emitted at the call site.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

// ============================================================================
// SECTION: Ledger Error
// ============================================================================

/// Ledger client failure, always one of two kinds (§4.4, §7).
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Network failure or 5xx response; the scheduler retries next poll.
    #[error("ledger unavailable: {0}")]
    LedgerUnavailable(String),
    /// A 4xx response; treated as a definite rejection, not retried blindly.
    #[error("ledger rejected request: {0}")]
    LedgerRejected(String),
}

impl LedgerError {
    /// Classifies a [`reqwest::Error`] into a [`LedgerError`].
    #[must_use]
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        Self::LedgerUnavailable(err.to_string())
    }

    /// Classifies an HTTP status code and response body into a [`LedgerError`].
    #[must_use]
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        if status.is_client_error() {
            Self::LedgerRejected(format!("{status}: {body}"))
        } else {
            Self::LedgerUnavailable(format!("{status}: {body}"))
        }
    }
}
