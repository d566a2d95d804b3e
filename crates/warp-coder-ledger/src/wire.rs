// warp-coder-ledger/src/wire.rs
// ============================================================================
// Module: Ledger Wire Protocol
// Description: JSON records and the base64-JSON envelope posted to /v1/events.
// Purpose: Give the batching client a typed shape for the ledger's one
//          accepting-endpoint wire format.
// Dependencies: base64, serde, serde_json
// ============================================================================

//! ## Overview
//! The ledger accepts exactly one write endpoint, `POST /v1/events`, taking a
//! JSON envelope `{d: base64(json({runs, groups, calls, links, outcomes,
//! acts}))}`. Every record in a batch is committed atomically: the ledger
//! accepts all of them or none (§4.4).

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Records
// ============================================================================

/// A new issue run record queued for the next flush.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Client-generated run id.
    pub id: String,
    /// Board-assigned issue identifier.
    pub issue_id: String,
    /// The board's issue number.
    pub issue_number: u64,
    /// Repository the issue belongs to.
    pub repo: String,
    /// Issue title at intake time.
    pub title: String,
}

/// A new phase-group record queued for the next flush.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupRecord {
    /// Client-generated group id.
    pub id: String,
    /// Phase-group node label.
    pub label: String,
}

/// A link tying a phase-group record to its parent issue run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Parent issue run id.
    pub parent_run_id: String,
    /// Child phase-group id.
    pub group_id: String,
}

/// A pipeline-run telemetry record ("calls" in the wire protocol).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    /// Client-generated pipeline run id.
    pub id: String,
    /// The act event this pipeline run is linked to.
    pub ref_act_id: String,
    /// Cost in US dollars, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_usd: Option<f64>,
    /// Wall-clock duration in milliseconds, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// `true` unless the executor's result type was `"error"`.
    pub success: bool,
    /// Free-form execution trace payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Value>,
}

/// An outcome event record queued for the next flush.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// Client-generated outcome id.
    pub id: String,
    /// Id of the container this outcome is recorded against.
    pub container_id: String,
    /// Outcome name, naming an entry in the states table.
    pub name: String,
    /// Free-form options carried by this outcome.
    #[serde(default)]
    pub opts: Value,
}

/// An act event record queued for the next flush.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActRecord {
    /// Client-generated act id.
    pub id: String,
    /// The outcome event this act was emitted from.
    pub outcome_id: String,
    /// Act name, naming a node in the compiled graph.
    pub name: String,
    /// Free-form options attached to the act.
    #[serde(default)]
    pub opts: Value,
}

// ============================================================================
// SECTION: Batch Envelope
// ============================================================================

/// The full set of records accumulated by one batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventBatch {
    /// New issue run records.
    #[serde(default)]
    pub runs: Vec<RunRecord>,
    /// New phase-group records.
    #[serde(default)]
    pub groups: Vec<GroupRecord>,
    /// New pipeline-run telemetry records.
    #[serde(default)]
    pub calls: Vec<CallRecord>,
    /// Links tying phase groups to their parent issue run.
    #[serde(default)]
    pub links: Vec<LinkRecord>,
    /// New outcome event records.
    #[serde(default)]
    pub outcomes: Vec<OutcomeRecord>,
    /// New act event records.
    #[serde(default)]
    pub acts: Vec<ActRecord>,
}

impl EventBatch {
    /// Returns `true` if the batch carries no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
            && self.groups.is_empty()
            && self.calls.is_empty()
            && self.links.is_empty()
            && self.outcomes.is_empty()
            && self.acts.is_empty()
    }

    /// Encodes the batch as the `{d: base64(json(...))}` envelope body.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the batch cannot be encoded as JSON.
    pub fn encode(&self) -> Result<EventEnvelope, serde_json::Error> {
        let json = serde_json::to_vec(self)?;
        Ok(EventEnvelope {
            d: STANDARD.encode(json),
        })
    }
}

/// The base64-JSON envelope body posted to `/v1/events`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Base64-encoded JSON-serialized [`EventBatch`].
    pub d: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use expect/unwrap for failure messages")]
mod tests {
    use super::EventBatch;
    use super::RunRecord;

    #[test]
    fn empty_batch_reports_empty() {
        assert!(EventBatch::default().is_empty());
    }

    #[test]
    fn non_empty_batch_encodes_to_base64_json() {
        let mut batch = EventBatch::default();
        batch.runs.push(RunRecord {
            id: "run1".to_string(),
            issue_id: "issue-1".to_string(),
            issue_number: 42,
            repo: "acme/widgets".to_string(),
            title: "Fix the widget".to_string(),
        });
        assert!(!batch.is_empty());
        let envelope = batch.encode().expect("should encode");
        assert!(!envelope.d.is_empty());
    }
}
