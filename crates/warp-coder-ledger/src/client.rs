// warp-coder-ledger/src/client.rs
// ============================================================================
// Module: Ledger Client
// Description: Typed client for the append-only ledger event store.
// Purpose: Batch outcome/act/group appends into one atomic POST and expose
//          the open-issue-runs query surface the scheduler polls.
// Dependencies: reqwest, serde_json, url, warp-coder-core
// ============================================================================

//! ## Overview
//! [`LedgerClient`] is stateless transport plus a small set of blocking HTTP
//! calls, following the same `reqwest::blocking::Client` idiom used
//! throughout this workspace's HTTP-backed adapters. The batching buffer
//! itself is per-call, not shared client state (§5 Shared Resources): every
//! `processRun` advancement calls [`LedgerClient::begin_batch`] to get a
//! fresh [`LedgerBatch`], queues events on it, and calls
//! [`LedgerBatch::flush`] exactly once.
//!
//! Every method blocks the calling thread; callers running inside an async
//! scheduler should invoke these through `tokio::task::spawn_blocking`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::Value;
use url::Url;
use warp_coder_core::ActId;
use warp_coder_core::Classification;
use warp_coder_core::IssueId;
use warp_coder_core::IssueRunId;
use warp_coder_core::OutcomeId;
use warp_coder_core::PendingAct;
use warp_coder_core::PhaseGroupId;
use warp_coder_core::PipelineRunId;
use warp_coder_core::Timestamp;
use warp_coder_core::entities::ContainerId;
use warp_coder_core::entities::OptsMap;
use warp_coder_core::timestamp_of;

use crate::error::LedgerError;
use crate::wire::ActRecord;
use crate::wire::CallRecord;
use crate::wire::EventBatch;
use crate::wire::GroupRecord;
use crate::wire::LinkRecord;
use crate::wire::OutcomeRecord;
use crate::wire::RunRecord;

/// HTTP call timeout (§5: "HTTP 15s").
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

// ============================================================================
// SECTION: Query Surface Types
// ============================================================================

/// One not-yet-terminal issue run, as returned by `findOpenIssueRuns` (§4.4).
///
/// Built client-side by [`LedgerClient::find_open_issue_runs`] from the raw
/// event log, never deserialized directly off the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenIssueRun {
    /// Stable id of this run.
    pub id: IssueRunId,
    /// Board-assigned issue identifier.
    pub issue_id: IssueId,
    /// The board's issue number.
    pub issue_number: u64,
    /// Repository the issue belongs to.
    pub repo: String,
    /// Issue title, as last observed.
    pub title: String,
    /// The name of the latest outcome observed for this run.
    pub latest_outcome: Option<String>,
    /// The run's pending act, if one is outstanding.
    pub pending_act: Option<PendingAct>,
    /// Phase-group label to phase-group id.
    pub groups: std::collections::BTreeMap<String, PhaseGroupId>,
}

/// A not-yet-terminal run's identity, as returned by `GET /v1/runs?label=…`
/// (§6). Carries none of the event-derived projection fields; those come
/// from a follow-up [`RunDetail`] fetch per run.
#[derive(Debug, Clone, Deserialize)]
struct RunStub {
    /// Server-known run id.
    id: String,
    /// Board-assigned issue identifier.
    issue_id: String,
    /// The board's issue number.
    issue_number: u64,
    /// Repository the issue belongs to.
    repo: String,
    /// Issue title, as last observed.
    title: String,
}

/// The per-run event sub-log returned by `GET /v1/runs/:id` (§4.4, §6):
/// every outcome and act recorded against the run itself or one of its
/// phase groups, plus the structural group-label index.
#[derive(Debug, Clone, Deserialize)]
struct RunDetail {
    /// Phase-group label to phase-group id.
    #[serde(default)]
    groups: std::collections::BTreeMap<String, PhaseGroupId>,
    /// Every outcome event recorded on the run or one of its groups.
    #[serde(default)]
    outcomes: Vec<OutcomeRecord>,
    /// Every act event recorded on the run or one of its groups.
    #[serde(default)]
    acts: Vec<ActRecord>,
}

/// One act matching a `GET /v1/acts?name=…` query (§6).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ActSummary {
    /// This event's id.
    pub id: ActId,
    /// The outcome event this act was emitted from.
    pub outcome_id: OutcomeId,
    /// Act name, naming a node in the compiled graph.
    pub name: String,
    /// Free-form options attached to the act.
    pub opts: OptsMap,
}

// ============================================================================
// SECTION: Ledger Client
// ============================================================================

/// A typed client for the append-only ledger event store.
#[derive(Debug, Clone)]
pub struct LedgerClient {
    /// Underlying blocking HTTP client.
    http: Client,
    /// Ledger base URL (scheme + host, no path).
    base_url: Url,
    /// Bearer token from `WARP_CODER_WARPMETRICS_KEY`, if telemetry is enabled.
    bearer_token: Option<String>,
}

impl LedgerClient {
    /// Builds a new ledger client.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::LedgerUnavailable`] if the HTTP client cannot
    /// be constructed (invalid TLS configuration).
    pub fn new(base_url: Url, bearer_token: Option<String>) -> Result<Self, LedgerError> {
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|err| LedgerError::LedgerUnavailable(err.to_string()))?;
        Ok(Self {
            http,
            base_url,
            bearer_token,
        })
    }

    /// Starts a new, empty batch. The returned [`LedgerBatch`] is not shared
    /// across threads; callers queue events on it and flush it once.
    #[must_use]
    pub fn begin_batch(&self) -> LedgerBatch<'_> {
        LedgerBatch {
            client: self,
            batch: EventBatch::default(),
        }
    }

    /// Queries every not-yet-terminal issue run (§4.4).
    ///
    /// The server names the open runs; everything else — `latestOutcome`,
    /// `pendingAct`, whether a branch's last act is still outstanding — is
    /// reconstructed here from each run's own event sub-log, per §4.4 ("the
    /// hard part (a)"). One list query plus one detail query per run.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] on network failure or a non-2xx response.
    pub fn find_open_issue_runs(&self) -> Result<Vec<OpenIssueRun>, LedgerError> {
        self.list_open_run_stubs()?
            .into_iter()
            .map(|stub| {
                let detail = self.fetch_run_detail(&stub.id)?;
                Ok(reconstruct_open_issue_run(stub, detail))
            })
            .collect()
    }

    /// Queries every act event recorded under a given act name, across runs
    /// (§6 `GET /v1/acts?name=…`).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] on network failure or a non-2xx response.
    pub fn find_acts_by_name(&self, act_name: &str) -> Result<Vec<ActSummary>, LedgerError> {
        let url = self.endpoint("/v1/acts")?;
        let response = self
            .authorized(self.http.get(url))
            .query(&[("name", act_name)])
            .send()
            .map_err(|err| LedgerError::from_reqwest(&err))?;
        read_json(response)
    }

    /// Fetches the open-issue-labelled run stubs (`GET /v1/runs?label=open`).
    fn list_open_run_stubs(&self) -> Result<Vec<RunStub>, LedgerError> {
        let url = self.endpoint("/v1/runs")?;
        let response = self
            .authorized(self.http.get(url))
            .query(&[("label", "open")])
            .send()
            .map_err(|err| LedgerError::from_reqwest(&err))?;
        read_json(response)
    }

    /// Fetches one run's event sub-log (`GET /v1/runs/:id`).
    fn fetch_run_detail(&self, run_id: &str) -> Result<RunDetail, LedgerError> {
        let path = format!("/v1/runs/{run_id}");
        let url = self.endpoint(&path)?;
        let response = self.authorized(self.http.get(url)).send().map_err(|err| LedgerError::from_reqwest(&err))?;
        read_json(response)
    }

    /// Idempotently registers an outcome classification (§4.4).
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] on network failure or a non-2xx response.
    pub fn register_classification(
        &self,
        outcome_name: &str,
        classification: Classification,
    ) -> Result<(), LedgerError> {
        let path = format!("/v1/outcomes/classifications/{outcome_name}");
        let url = self.endpoint(&path)?;
        let body = serde_json::json!({ "classification": classification.as_str() });
        let response =
            self.authorized(self.http.put(url)).json(&body).send().map_err(|err| LedgerError::from_reqwest(&err))?;
        discard(response)
    }

    /// Registers every outcome classification the caller supplies, idempotently.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] from the first classification that fails to register.
    pub fn register_classifications(
        &self,
        classifications: &[(String, Classification)],
    ) -> Result<(), LedgerError> {
        for (outcome_name, classification) in classifications {
            self.register_classification(outcome_name, *classification)?;
        }
        Ok(())
    }

    /// Resolves a path against the ledger's base URL.
    fn endpoint(&self, path: &str) -> Result<Url, LedgerError> {
        self.base_url.join(path).map_err(|err| LedgerError::LedgerUnavailable(err.to_string()))
    }

    /// Attaches the bearer token to a request builder, if telemetry is enabled.
    fn authorized(&self, builder: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.bearer_token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }
}

/// Reads a JSON response body, classifying non-2xx statuses.
fn read_json<T: for<'de> Deserialize<'de>>(response: reqwest::blocking::Response) -> Result<T, LedgerError> {
    let status = response.status();
    let body = response.text().map_err(|err| LedgerError::from_reqwest(&err))?;
    if !status.is_success() {
        return Err(LedgerError::from_status(status, &body));
    }
    serde_json::from_str(&body).map_err(|err| LedgerError::LedgerUnavailable(err.to_string()))
}

/// Discards a response body after classifying non-2xx statuses.
fn discard(response: reqwest::blocking::Response) -> Result<(), LedgerError> {
    let status = response.status();
    let body = response.text().map_err(|err| LedgerError::from_reqwest(&err))?;
    if status.is_success() { Ok(()) } else { Err(LedgerError::from_status(status, &body)) }
}

// ============================================================================
// SECTION: Per-Run Reconstruction
// ============================================================================

/// Projects a [`RunStub`] plus its [`RunDetail`] event sub-log into an
/// [`OpenIssueRun`] (§4.4).
fn reconstruct_open_issue_run(stub: RunStub, detail: RunDetail) -> OpenIssueRun {
    let latest_outcome = detail
        .outcomes
        .iter()
        .filter(|outcome| outcome.container_id == stub.id)
        .max_by_key(|outcome| event_order_key(&outcome.id))
        .map(|outcome| outcome.name.clone());

    let pending_act = detail
        .acts
        .iter()
        .max_by_key(|act| event_order_key(&act.id))
        .filter(|candidate| act_is_still_pending(candidate, &detail.outcomes))
        .map(|candidate| PendingAct {
            id: ActId::new(candidate.id.clone()),
            name: candidate.name.clone(),
            opts: candidate.opts.as_object().cloned().unwrap_or_default(),
        });

    OpenIssueRun {
        id: IssueRunId::new(stub.id),
        issue_id: IssueId::new(stub.issue_id),
        issue_number: stub.issue_number,
        repo: stub.repo,
        title: stub.title,
        latest_outcome,
        pending_act,
        groups: detail.groups,
    }
}

/// Returns `true` if `candidate` has not yet produced a newer outcome on the
/// container it was emitted into — the act is still the branch's pending act
/// (§4.4: "the last act on a container with no following outcome on its
/// emitted branch is the container's pending act").
fn act_is_still_pending(candidate: &ActRecord, outcomes: &[OutcomeRecord]) -> bool {
    let Some(origin) = outcomes.iter().find(|outcome| outcome.id == candidate.outcome_id) else {
        return true;
    };
    let origin_order = event_order_key(&origin.id);
    !outcomes
        .iter()
        .filter(|outcome| outcome.container_id == origin.container_id)
        .any(|outcome| event_order_key(&outcome.id) > origin_order)
}

/// Orders an event id by its embedded timestamp, falling back to the id's
/// own ordering for ids without a decodable timestamp (e.g. hand-built test
/// fixtures) so reconstruction stays deterministic either way.
fn event_order_key(id: &str) -> (i64, &str) {
    (timestamp_of(id).unwrap_or(i64::MIN), id)
}

// ============================================================================
// SECTION: Ledger Batch
// ============================================================================

/// A per-call batch of queued events, flushed as one atomic POST (§4.4, §5).
#[derive(Debug)]
pub struct LedgerBatch<'a> {
    /// The client this batch will flush through.
    client: &'a LedgerClient,
    /// Accumulated records, queued in call order.
    batch: EventBatch,
}

impl LedgerBatch<'_> {
    /// Queues a new issue run. Returns its client-generated id.
    pub fn batch_run(&mut self, issue_id: &IssueId, issue_number: u64, repo: &str, title: &str, now: Timestamp) -> IssueRunId {
        let id = IssueRunId::generate(now);
        self.batch.runs.push(RunRecord {
            id: id.to_string(),
            issue_id: issue_id.to_string(),
            issue_number,
            repo: repo.to_string(),
            title: title.to_string(),
        });
        id
    }

    /// Queues a new phase group, linked to its parent issue run.
    pub fn batch_group(&mut self, parent_run_id: &IssueRunId, label: &str, now: Timestamp) -> PhaseGroupId {
        let id = PhaseGroupId::generate(now);
        self.batch.groups.push(GroupRecord {
            id: id.to_string(),
            label: label.to_string(),
        });
        self.batch.links.push(LinkRecord {
            parent_run_id: parent_run_id.to_string(),
            group_id: id.to_string(),
        });
        id
    }

    /// Queues an outcome event on the resolved container.
    pub fn batch_outcome(&mut self, container: &ContainerId, name: &str, opts: &OptsMap, now: Timestamp) -> OutcomeId {
        let id = OutcomeId::generate(now);
        self.batch.outcomes.push(OutcomeRecord {
            id: id.to_string(),
            container_id: container_id_str(container),
            name: name.to_string(),
            opts: Value::Object(opts.clone()),
        });
        id
    }

    /// Queues an act event emitted from an outcome.
    pub fn batch_act(&mut self, outcome_id: &OutcomeId, name: &str, opts: &OptsMap, now: Timestamp) -> ActId {
        let id = ActId::generate(now);
        self.batch.acts.push(ActRecord {
            id: id.to_string(),
            outcome_id: outcome_id.to_string(),
            name: name.to_string(),
            opts: Value::Object(opts.clone()),
        });
        id
    }

    /// Queues a pipeline-run telemetry record under a caller-supplied id,
    /// linked to the act it reports on.
    ///
    /// The id is supplied rather than generated here so a scheduler can
    /// mint it ahead of invoking an executor (scoping the executor's
    /// [`warp_coder_core::Context::pipeline_run_id`]) and record the
    /// telemetry for the same id once the call completes (§4.6 step 3).
    pub fn batch_call(
        &mut self,
        pipeline_run_id: &PipelineRunId,
        ref_act_id: &ActId,
        cost_usd: Option<f64>,
        duration_ms: Option<u64>,
        success: bool,
        trace: Option<Value>,
    ) {
        self.batch.calls.push(CallRecord {
            id: pipeline_run_id.to_string(),
            ref_act_id: ref_act_id.to_string(),
            cost_usd,
            duration_ms,
            success,
            trace,
        });
    }

    /// Returns `true` if no events have been queued yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    /// Flushes every queued event as a single `POST /v1/events`.
    ///
    /// On failure, no partial events are observed by a subsequent query
    /// (§4.4, §8 invariant 4): the ledger accepts the whole batch or none.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] on network failure or a non-2xx response.
    pub fn flush(self) -> Result<(), LedgerError> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let envelope = self.batch.encode().map_err(|err| LedgerError::LedgerUnavailable(err.to_string()))?;
        let url = self.client.endpoint("/v1/events")?;
        let response = self
            .client
            .authorized(self.client.http.post(url))
            .json(&envelope)
            .send()
            .map_err(|err| LedgerError::from_reqwest(&err))?;
        discard(response)
    }
}

/// Renders a container reference as the opaque id string the wire protocol expects.
fn container_id_str(container: &ContainerId) -> String {
    match container {
        ContainerId::IssueRun(id) => id.to_string(),
        ContainerId::PhaseGroup(id) => id.to_string(),
        ContainerId::PipelineRun(id) => id.to_string(),
    }
}
