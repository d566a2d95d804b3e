// warp-coder-core/src/time.rs
// ============================================================================
// Module: Warp Coder Time Model
// Description: Canonical timestamp representation for events and records.
// Purpose: Provide a single explicit time value threaded through every event.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Warp Coder never reads wall-clock time inside the core or scheduler crates;
//! callers (the scheduler's poll loop, adapters) supply timestamps explicitly
//! so that event sequences stay replayable in tests.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Timestamp
// ============================================================================

/// Unix epoch milliseconds, explicitly supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix epoch milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }

    /// Returns the current wall-clock time.
    ///
    /// Clamps to zero if the system clock reads earlier than the unix epoch,
    /// and to `i64::MAX` millis if it overflows (it will not, before the
    /// year 292 million).
    #[must_use]
    pub fn now() -> Self {
        let elapsed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or(std::time::Duration::ZERO);
        Self(i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
    }
}
