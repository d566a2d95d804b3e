// warp-coder-adapters/src/coder.rs
// ============================================================================
// Module: Coder Client
// Description: Contract for the external code-generation subprocess.
// Purpose: Let executors run the coder with streamed JSON events, parse its
//          final envelope, and produce a trace record for ledger telemetry.
// Dependencies: async_trait, thiserror, warp_coder_core
// ============================================================================

//! ## Overview
//! Work-act executors such as Build and Implement drive the coder
//! subprocess through [`CoderClient`]. A full session (`run`) may run for
//! up to the configured full-session timeout (documented default ~1 hour);
//! a single turn (`one_shot`) is bounded much tighter (documented default
//! 60s) (§5). Both produce an [`ExecutionTrace`] for ledger telemetry. The
//! coder subprocess protocol beyond what the scheduler consumes is out of
//! scope (spec §1); this crate defines only the envelope shape the
//! scheduler and executors rely on.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use thiserror::Error;
use warp_coder_core::executor::ExecutionTrace;

// ============================================================================
// SECTION: Public Types
// ============================================================================

/// One streamed event emitted by the coder subprocess while it runs.
#[derive(Debug, Clone, PartialEq)]
pub enum CoderEvent {
    /// A chunk of assistant-visible text.
    Text(String),
    /// A tool invocation the coder performed.
    ToolUse {
        /// Tool name.
        name: String,
        /// Opaque tool input, as reported by the subprocess.
        input: serde_json::Value,
    },
    /// A tool's result, paired with the invocation that produced it.
    ToolResult {
        /// Tool name this result corresponds to.
        name: String,
        /// Opaque tool output, as reported by the subprocess.
        output: serde_json::Value,
    },
}

/// Why a coder session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionSubtype {
    /// The session completed normally.
    Success,
    /// The session hit the configured maximum-turn budget.
    MaxTurns,
}

/// The final envelope a coder session or one-shot turn resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct CoderEnvelope {
    /// The coder's final result text.
    pub result_text: String,
    /// Cost in US dollars reported by the subprocess, if any.
    pub cost_usd: Option<f64>,
    /// Opaque session identifier, usable to resume a multi-turn session.
    pub session_id: Option<String>,
    /// How the session ended.
    pub subtype: CompletionSubtype,
}

/// Options governing one coder invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Maximum number of turns the coder may take before being cut off.
    pub max_turns: Option<u32>,
    /// Tool names the coder is permitted to use; `None` permits its defaults.
    pub allowed_tools: Option<Vec<String>>,
    /// Tool names the coder is forbidden from using.
    pub disallowed_tools: Vec<String>,
    /// Working directory the subprocess should run in.
    pub working_dir: String,
}

/// Coder client failures.
#[derive(Debug, Error)]
pub enum CoderError {
    /// The subprocess could not be started.
    #[error("coder subprocess failed to start: {0}")]
    SpawnFailed(String),
    /// The subprocess emitted an event the client could not parse.
    #[error("coder subprocess emitted a malformed event: {0}")]
    MalformedEvent(String),
    /// The subprocess exceeded its bounded timeout and was force-killed.
    #[error("coder subprocess timed out")]
    TimedOut,
    /// The subprocess exited non-zero without producing a final envelope.
    #[error("coder subprocess exited with an error: {0}")]
    ExitedWithError(String),
}

// ============================================================================
// SECTION: Coder Client
// ============================================================================

/// Thin, contract-only interface onto the external code-generation
/// subprocess (§4.7).
#[async_trait]
pub trait CoderClient: Send + Sync {
    /// Runs a full coder session, invoking `on_event` for each streamed
    /// event as it arrives, then returns the final envelope.
    ///
    /// Cancellable: dropping the returned future's enclosing task sends the
    /// subprocess a termination signal and waits a bounded grace period
    /// before force-killing it.
    ///
    /// # Errors
    ///
    /// Returns [`CoderError`] when the subprocess fails to start, times
    /// out, or exits without a final envelope.
    async fn run(
        &self,
        prompt: &str,
        options: &RunOptions,
        on_event: &mut (dyn FnMut(CoderEvent) + Send),
    ) -> Result<CoderEnvelope, CoderError>;

    /// Runs a single coder turn with no streaming callback, bounded by a
    /// tighter timeout than [`CoderClient::run`].
    ///
    /// # Errors
    ///
    /// Returns [`CoderError`] under the same conditions as
    /// [`CoderClient::run`].
    async fn one_shot(&self, prompt: &str, options: &RunOptions) -> Result<CoderEnvelope, CoderError>;
}

/// Builds an [`ExecutionTrace`] for ledger telemetry from a coder envelope.
#[must_use]
pub fn trace_from_envelope(envelope: &CoderEnvelope) -> ExecutionTrace {
    let mut payload = warp_coder_core::entities::OptsMap::new();
    payload.insert(
        "resultText".to_string(),
        serde_json::Value::String(envelope.result_text.clone()),
    );
    if let Some(session_id) = &envelope.session_id {
        payload.insert("sessionId".to_string(), serde_json::Value::String(session_id.clone()));
    }
    let subtype = match envelope.subtype {
        CompletionSubtype::Success => "success",
        CompletionSubtype::MaxTurns => "max_turns",
    };
    payload.insert("subtype".to_string(), serde_json::Value::String(subtype.to_string()));
    ExecutionTrace { payload }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use expect/unwrap for failure messages")]
mod tests {
    use super::CompletionSubtype;
    use super::CoderEnvelope;
    use super::trace_from_envelope;

    #[test]
    fn trace_from_envelope_carries_result_text_and_subtype() {
        let envelope = CoderEnvelope {
            result_text: "done".to_string(),
            cost_usd: Some(0.42),
            session_id: Some("sess-1".to_string()),
            subtype: CompletionSubtype::MaxTurns,
        };
        let trace = trace_from_envelope(&envelope);
        assert_eq!(
            trace.payload.get("resultText").and_then(serde_json::Value::as_str),
            Some("done")
        );
        assert_eq!(trace.payload.get("subtype").and_then(serde_json::Value::as_str), Some("max_turns"));
        assert_eq!(
            trace.payload.get("sessionId").and_then(serde_json::Value::as_str),
            Some("sess-1")
        );
    }
}
