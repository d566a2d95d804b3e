// warp-coder-core/src/ids.rs
// ============================================================================
// Module: Warp Coder Identifiers
// Description: Client-generated opaque identifiers for ledger entities.
// Purpose: Let the ledger client batch events that reference each other
//          without a server round-trip.
// Dependencies: rand, serde
// ============================================================================

//! ## Overview
//! Every durable entity and event carries a client-generated id: a short type
//! prefix, a millisecond timestamp encoded in base36, and a 16-hex-character
//! random suffix. Because ids never depend on a server response, the ledger
//! client can queue a batch of events that reference each other (an act that
//! names the outcome id it follows, a group link that names its parent run
//! id) and flush them as one POST.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use rand::Rng;
use serde::Deserialize;
use serde::Serialize;

use crate::time::Timestamp;

// ============================================================================
// SECTION: Id Kinds
// ============================================================================

/// The entity kind an id prefix identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    /// Issue run id, prefix `run`.
    IssueRun,
    /// Phase group id, prefix `grp`.
    PhaseGroup,
    /// Pipeline run id, prefix `ppl`.
    PipelineRun,
    /// Outcome id, prefix `out`.
    Outcome,
    /// Act id, prefix `act`.
    Act,
}

impl IdKind {
    const fn prefix(self) -> &'static str {
        match self {
            Self::IssueRun => "run",
            Self::PhaseGroup => "grp",
            Self::PipelineRun => "ppl",
            Self::Outcome => "out",
            Self::Act => "act",
        }
    }
}

/// Generates a client-side id of the form `<prefix><base36 millis><16 hex>`.
#[must_use]
pub fn generate(kind: IdKind, now: Timestamp) -> String {
    let millis = u128::try_from(now.as_unix_millis().max(0)).unwrap_or(0);
    let mut suffix = [0u8; 16];
    rand::thread_rng().fill(&mut suffix);
    let mut hex = String::with_capacity(16);
    for byte in suffix.iter().take(8) {
        hex.push_str(&format!("{byte:02x}"));
    }
    format!("{}{}{}", kind.prefix(), to_base36(millis), hex)
}

/// Renders a value in lowercase base36.
fn to_base36(mut value: u128) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while value > 0 {
        let digit = usize::try_from(value % 36).unwrap_or(0);
        buf.push(DIGITS[digit]);
        value /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}

/// Parses a lowercase base36 string back into its value.
fn from_base36(digits: &str) -> Option<u128> {
    if digits.is_empty() {
        return None;
    }
    let mut value: u128 = 0;
    for ch in digits.chars() {
        let digit = ch.to_digit(36)?;
        value = value.checked_mul(36)?.checked_add(u128::from(digit))?;
    }
    Some(value)
}

/// Fixed width, in bytes, of the random hex suffix every generated id carries.
const SUFFIX_LEN: usize = 16;

/// Recovers the millisecond timestamp embedded in a client-generated id.
///
/// Returns `None` if `id` is shorter than a 3-char prefix plus the 16-hex
/// suffix, or if the timestamp segment between them is not valid base36.
/// Ids from an untrusted or hand-built source (e.g. test fixtures) may not
/// round-trip; callers reconstructing event order should treat `None` as
/// "unknown, sort last."
#[must_use]
pub fn timestamp_of(id: &str) -> Option<i64> {
    let prefix_len = 3;
    if id.len() < prefix_len + SUFFIX_LEN {
        return None;
    }
    let timestamp_segment = &id[prefix_len..id.len() - SUFFIX_LEN];
    let millis = from_base36(timestamp_segment)?;
    i64::try_from(millis).ok()
}

// ============================================================================
// SECTION: Identifier Macro
// ============================================================================

macro_rules! opaque_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from an existing string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

opaque_id!(IssueRunId, "Stable id of an issue run.");
opaque_id!(PhaseGroupId, "Stable id of a phase group.");
opaque_id!(PipelineRunId, "Stable id of a pipeline run.");
opaque_id!(OutcomeId, "Stable id of an appended outcome event.");
opaque_id!(ActId, "Stable id of an appended act event.");
opaque_id!(IssueId, "Board-assigned issue identifier (not client-generated).");

impl IssueRunId {
    /// Generates a new client-side issue run id.
    #[must_use]
    pub fn generate(now: Timestamp) -> Self {
        Self(generate(IdKind::IssueRun, now))
    }
}

impl PhaseGroupId {
    /// Generates a new client-side phase group id.
    #[must_use]
    pub fn generate(now: Timestamp) -> Self {
        Self(generate(IdKind::PhaseGroup, now))
    }
}

impl PipelineRunId {
    /// Generates a new client-side pipeline run id.
    #[must_use]
    pub fn generate(now: Timestamp) -> Self {
        Self(generate(IdKind::PipelineRun, now))
    }
}

impl OutcomeId {
    /// Generates a new client-side outcome id.
    #[must_use]
    pub fn generate(now: Timestamp) -> Self {
        Self(generate(IdKind::Outcome, now))
    }
}

impl ActId {
    /// Generates a new client-side act id.
    #[must_use]
    pub fn generate(now: Timestamp) -> Self {
        Self(generate(IdKind::Act, now))
    }
}

#[cfg(test)]
mod tests {
    use super::IdKind;
    use super::IssueRunId;
    use super::generate;
    use super::timestamp_of;
    use crate::time::Timestamp;

    #[test]
    fn generated_ids_carry_their_prefix() {
        let id = generate(IdKind::IssueRun, Timestamp::from_unix_millis(1_700_000_000_000));
        assert!(id.starts_with("run"));
    }

    #[test]
    fn timestamp_of_round_trips_through_generate() {
        let id = generate(IdKind::Act, Timestamp::from_unix_millis(1_700_000_000_123));
        assert_eq!(timestamp_of(&id), Some(1_700_000_000_123));
    }

    #[test]
    fn timestamp_of_rejects_an_id_too_short_for_a_suffix() {
        assert_eq!(timestamp_of("run1"), None);
    }

    #[test]
    fn generated_ids_are_unique() {
        let now = Timestamp::from_unix_millis(1_700_000_000_000);
        let a = IssueRunId::generate(now);
        let b = IssueRunId::generate(now);
        assert_ne!(a, b);
    }

    #[test]
    fn base36_round_trips_zero() {
        assert_eq!(super::to_base36(0), "0");
    }
}
