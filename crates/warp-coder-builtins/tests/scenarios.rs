// warp-coder-builtins/tests/scenarios.rs
// ============================================================================
// Module: End-to-End Workflow Scenarios
// Description: Drives `processRun` against minimal hand-built graphs and an
//              in-process mock ledger, asserting the exact emitted event
//              sequence for each of §8's concrete scenarios.
// Purpose: Exercise invariant 4 (atomic commit, one `/events` POST per
//          edge-list) and invariant 3 (executor contract) end to end, rather
//          than unit-by-unit.
// Dependencies: warp_coder_core, warp_coder_adapters, warp_coder_ledger,
//               warp_coder_scheduler, tiny_http, base64
// ============================================================================

//! ## Overview
//! Every test here builds its own tiny `GraphDocument` (a handful of acts),
//! registers scripted executors that return a fixed sequence of results, and
//! runs it against a `tiny_http`-backed ledger standing in for the real
//! service. The mock records every decoded `EventBatch` it receives so a
//! test can assert both the order of `/events` POSTs and the outcome names
//! mirrored onto the issue run.
//!
//! Scenarios 4 (retry-from-blocked) and 5 (abort-from-board) are not
//! exercised here: both live entirely in `Scheduler::poll_cycle`
//! (`retry_from_blocked`, `scan_terminal_columns`), never call `processRun`,
//! and so have no counterpart at this crate's level — see DESIGN.md.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "integration-test assertions and scripted-executor stubs use panic/expect for failure messages"
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::VecDeque;
use std::io::Read;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tiny_http::Response;
use tiny_http::Server;
use warp_coder_adapters::BoardAdapter;
use warp_coder_adapters::BoardColumn;
use warp_coder_adapters::BoardError;
use warp_coder_adapters::BoardItem;
use warp_coder_adapters::ContextProviderRegistry;
use warp_coder_core::ActId;
use warp_coder_core::Context;
use warp_coder_core::ExecutorError;
use warp_coder_core::ExecutorRegistry;
use warp_coder_core::ExecutorResult;
use warp_coder_core::IssueId;
use warp_coder_core::IssueRun;
use warp_coder_core::IssueRunId;
use warp_coder_core::PendingAct;
use warp_coder_core::ResultType;
use warp_coder_core::Timestamp;
use warp_coder_core::WorkflowExecutor;
use warp_coder_core::entities::OptsMap;
use warp_coder_core::graph::Graph;
use warp_coder_core::graph::document::EdgeDocument;
use warp_coder_core::graph::document::GraphDocument;
use warp_coder_core::graph::document::NodeDocument;
use warp_coder_ledger::EventBatch;
use warp_coder_ledger::EventEnvelope;
use warp_coder_ledger::LedgerClient;
use warp_coder_scheduler::EffectRegistry;
use warp_coder_scheduler::effects::Effect;
use warp_coder_scheduler::process_run;

// ============================================================================
// SECTION: Mock Ledger
// ============================================================================

/// Serves exactly `expected_posts` `POST /v1/events` requests, decoding and
/// recording each one, then stops. Mirrors the teacher's
/// `decision-gate-providers` `tiny_http` mock-server idiom.
fn run_mock_ledger(expected_posts: usize) -> (String, Arc<Mutex<Vec<EventBatch>>>, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").expect("binds");
    let addr = server.server_addr().to_ip().expect("ip addr");
    let batches = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&batches);
    let handle = thread::spawn(move || {
        for _ in 0 .. expected_posts {
            let Ok(mut request) = server.recv() else { break };
            let mut body = String::new();
            request.as_reader().read_to_string(&mut body).expect("reads request body");
            let envelope: EventEnvelope = serde_json::from_str(&body).expect("valid envelope json");
            let decoded = STANDARD.decode(envelope.d).expect("valid base64");
            let batch: EventBatch = serde_json::from_slice(&decoded).expect("valid batch json");
            recorded.lock().expect("lock").push(batch);
            let _ = request.respond(Response::from_string("{}"));
        }
    });
    (format!("http://{addr}"), batches, handle)
}

/// Names mirrored onto the issue run (`container_id == run_id`) across every
/// recorded batch, in arrival order (§8 invariant 4, §8 invariant 5).
fn mirrored_outcome_names(batches: &[EventBatch], run_id: &str) -> Vec<String> {
    batches
        .iter()
        .flat_map(|batch| batch.outcomes.iter())
        .filter(|outcome| outcome.container_id == run_id)
        .map(|outcome| outcome.name.clone())
        .collect()
}

/// Phase-group labels opened across every recorded batch, in arrival order.
fn group_labels(batches: &[EventBatch]) -> Vec<String> {
    batches.iter().flat_map(|batch| batch.groups.iter()).map(|group| group.label.clone()).collect()
}

// ============================================================================
// SECTION: Scripted Executor
// ============================================================================

/// A `WorkflowExecutor` that returns one canned result per invocation, in
/// order, and records every `Context` it was invoked with.
struct ScriptedExecutor {
    name: String,
    result_types: BTreeSet<String>,
    script: Mutex<VecDeque<ExecutorResult>>,
    invocations: Mutex<Vec<Context>>,
}

impl ScriptedExecutor {
    fn new(name: &str, result_types: &[&str], script: Vec<ExecutorResult>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            result_types: result_types.iter().map(|s| (*s).to_string()).collect(),
            script: Mutex::new(script.into_iter().collect()),
            invocations: Mutex::new(Vec::new()),
        })
    }

    fn invocation_opts(&self, index: usize) -> OptsMap {
        self.invocations.lock().expect("lock").get(index).expect("invocation recorded").act_opts.clone()
    }
}

#[async_trait]
impl WorkflowExecutor for ScriptedExecutor {
    fn name(&self) -> &str {
        &self.name
    }

    fn result_types(&self) -> &BTreeSet<String> {
        &self.result_types
    }

    async fn execute(&self, _run: &IssueRun, ctx: &Context) -> Result<ExecutorResult, ExecutorError> {
        self.invocations.lock().expect("lock").push(ctx.clone());
        let mut script = self.script.lock().expect("lock");
        let next = script.pop_front().unwrap_or_else(|| panic!("scripted executor '{}' ran out of results", self.name));
        Ok(next)
    }
}

// ============================================================================
// SECTION: Recording Board
// ============================================================================

/// A board double recording every `sync_state` call, in order.
#[derive(Default)]
struct RecordingBoard {
    synced: Mutex<Vec<BoardColumn>>,
}

#[async_trait]
impl BoardAdapter for RecordingBoard {
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
    async fn sync_state(&self, _item: &BoardItem, column: BoardColumn) -> Result<(), BoardError> {
        self.synced.lock().expect("lock").push(column);
        Ok(())
    }
}

/// Yields repeatedly so `processRun`'s fire-and-forget `tokio::spawn` board
/// sync has a chance to run before the test inspects `RecordingBoard`.
async fn drain_spawned_tasks() {
    for _ in 0 .. 16 {
        tokio::task::yield_now().await;
    }
}

// ============================================================================
// SECTION: Shared Helpers
// ============================================================================

fn sample_run(pending_act: &str) -> IssueRun {
    IssueRun {
        id: IssueRunId::generate(Timestamp::from_unix_millis(0)),
        issue_id: IssueId::new("issue-1"),
        issue_number: 1,
        repo: "acme/widgets".to_string(),
        title: "Fix the widget".to_string(),
        latest_outcome: None,
        pending_act: Some(PendingAct {
            id: ActId::generate(Timestamp::from_unix_millis(0)),
            name: pending_act.to_string(),
            opts: OptsMap::new(),
        }),
        groups: BTreeMap::new(),
        board_item: None,
    }
}

fn ledger_at(url: &str) -> Arc<LedgerClient> {
    Arc::new(LedgerClient::new(url.parse().expect("valid url"), None).expect("client builds"))
}

fn opts(value: serde_json::Value) -> OptsMap {
    value.as_object().expect("object literal").clone()
}

fn result_with_opts(result_type: &str, outcome_opts: OptsMap, next_act_opts: Option<OptsMap>) -> ExecutorResult {
    let mut result = ExecutorResult::new(ResultType::from(result_type));
    result.outcome_opts = outcome_opts;
    result.next_act_opts = next_act_opts;
    result
}

fn phase_group(label: &str, created_outcome: &str, container: &str, next: Option<&str>) -> NodeDocument {
    NodeDocument {
        label: label.to_string(),
        executor: "none".to_string(),
        group: None,
        results: BTreeMap::from([(
            "created".to_string(),
            vec![EdgeDocument { name: created_outcome.to_string(), container: Some(container.to_string()), next: next.map(str::to_string) }],
        )]),
    }
}

fn work_act(label: &str, executor: &str, group: &str, result_type: &str, outcome: &str, container: &str, next: Option<&str>) -> NodeDocument {
    NodeDocument {
        label: label.to_string(),
        executor: executor.to_string(),
        group: Some(group.to_string()),
        results: BTreeMap::from([(
            result_type.to_string(),
            vec![EdgeDocument { name: outcome.to_string(), container: Some(container.to_string()), next: next.map(str::to_string) }],
        )]),
    }
}

// ============================================================================
// SECTION: Scenario 1 — Happy path implement -> review -> merge
// ============================================================================

fn scenario1_graph() -> Graph {
    let acts = BTreeMap::from([
        ("Build".to_string(), phase_group("Build", "Building", "Build", Some("Implement"))),
        ("Implement".to_string(), work_act("Implement", "implement", "Build", "success", "PrCreated", "Build", Some("Review"))),
        ("Review".to_string(), phase_group("Review", "Reviewing", "Review", Some("Evaluate"))),
        ("Evaluate".to_string(), work_act("Evaluate", "review", "Review", "approved", "Approved", "Review", Some("Merge"))),
        ("Merge".to_string(), work_act("Merge", "merge", "Review", "success", "Merged", "Review", Some("Deploy"))),
        ("Deploy".to_string(), phase_group("Deploy", "AwaitingDeploy", "Deploy", None)),
    ]);
    let states = BTreeMap::from([
        ("Building".to_string(), "inProgress".to_string()),
        ("PrCreated".to_string(), "inReview".to_string()),
        ("Reviewing".to_string(), "inReview".to_string()),
        ("Approved".to_string(), "readyForDeploy".to_string()),
        ("Merged".to_string(), "readyForDeploy".to_string()),
        ("AwaitingDeploy".to_string(), "readyForDeploy".to_string()),
    ]);
    let document = GraphDocument { acts, states, initial_act: "Build".to_string() };
    let executor_types = BTreeMap::from([
        ("implement".to_string(), BTreeSet::from(["success".to_string()])),
        ("review".to_string(), BTreeSet::from(["approved".to_string()])),
        ("merge".to_string(), BTreeSet::from(["success".to_string()])),
    ]);
    Graph::compile(&document, &executor_types).expect("scenario 1 graph compiles")
}

#[tokio::test]
async fn scenario1_happy_path_implement_review_merge() {
    let graph = scenario1_graph();
    let prs = opts(serde_json::json!({"prs": [{"repo": "o/r", "prNumber": 1}]}));

    let implement = ScriptedExecutor::new("implement", &["success"], vec![result_with_opts("success", prs.clone(), None)]);
    let review = ScriptedExecutor::new("review", &["approved"], vec![ExecutorResult::new(ResultType::from("approved"))]);
    let merge = ScriptedExecutor::new("merge", &["success"], vec![ExecutorResult::new(ResultType::from("success"))]);

    let mut executors = ExecutorRegistry::new();
    executors.register(implement);
    executors.register(review);
    executors.register(merge);

    let context_providers = ContextProviderRegistry::new();
    let effects = EffectRegistry::new();
    let (url, batches, server) = run_mock_ledger(9);
    let ledger = ledger_at(&url);
    let board = Arc::new(RecordingBoard::default());
    let board_adapter: Arc<dyn BoardAdapter> = board.clone();

    let mut run = sample_run("Build");
    run.board_item = Some("item-1".to_string());
    let run_id = run.id.to_string();

    let run = process_run(&graph, &executors, &context_providers, &effects, &ledger, &board_adapter, run).await;
    drain_spawned_tasks().await;
    server.join().expect("server thread joins");

    assert_eq!(run.pending_act, None, "Deploy's created edge has no next; the run should close out");
    assert_eq!(run.latest_outcome.as_deref(), Some("AwaitingDeploy"));

    let batches = batches.lock().expect("lock");
    assert_eq!(batches.len(), 9, "one POST per phase-group open and per edge-list commit");
    assert_eq!(
        mirrored_outcome_names(&batches, &run_id),
        vec!["Building", "PrCreated", "Reviewing", "Approved", "Merged", "AwaitingDeploy"],
    );
    assert_eq!(group_labels(&batches), vec!["Build", "Review", "Deploy"]);

    let pr_created_opts = batches
        .iter()
        .flat_map(|batch| batch.outcomes.iter())
        .find(|outcome| outcome.name == "PrCreated")
        .map(|outcome| outcome.opts.clone())
        .expect("a PrCreated outcome was recorded");
    assert_eq!(pr_created_opts, serde_json::Value::Object(prs));

    let synced = board.synced.lock().expect("lock");
    assert_eq!(
        *synced,
        vec![
            BoardColumn::InProgress,
            BoardColumn::InReview,
            BoardColumn::InReview,
            BoardColumn::ReadyForDeploy,
            BoardColumn::ReadyForDeploy,
            BoardColumn::ReadyForDeploy,
        ],
        "board column transitions should read todo -> inProgress -> inReview -> readyForDeploy",
    );
}

// ============================================================================
// SECTION: Scenario 2 — Clarification loop
// ============================================================================

fn scenario2_graph() -> Graph {
    let mut implement_results = BTreeMap::new();
    implement_results.insert(
        "ask_user".to_string(),
        vec![EdgeDocument { name: "NeedsClarification".to_string(), container: Some("Build".to_string()), next: Some("AwaitReply".to_string()) }],
    );
    implement_results.insert(
        "success".to_string(),
        vec![EdgeDocument { name: "Implemented".to_string(), container: Some("Build".to_string()), next: None }],
    );
    let acts = BTreeMap::from([
        ("Build".to_string(), phase_group("Build", "Building", "Build", Some("Implement"))),
        (
            "Implement".to_string(),
            NodeDocument { label: "Implement".to_string(), executor: "implement".to_string(), group: Some("Build".to_string()), results: implement_results },
        ),
        ("AwaitReply".to_string(), work_act("AwaitReply", "await_reply", "Build", "replied", "Clarified", "Build", Some("Implement"))),
    ]);
    let states = BTreeMap::from([
        ("Building".to_string(), "inProgress".to_string()),
        ("NeedsClarification".to_string(), "waiting".to_string()),
        ("Clarified".to_string(), "inProgress".to_string()),
        ("Implemented".to_string(), "inReview".to_string()),
    ]);
    let document = GraphDocument { acts, states, initial_act: "Build".to_string() };
    // "waiting" is never a node result-type key (invoke_work_act special-cases
    // it before a graph-edge lookup), so it is excluded here even though the
    // executor itself declares it for `ExecutorRegistry::invoke`'s own check.
    let executor_types = BTreeMap::from([
        ("implement".to_string(), BTreeSet::from(["ask_user".to_string(), "success".to_string()])),
        ("await_reply".to_string(), BTreeSet::from(["replied".to_string()])),
    ]);
    Graph::compile(&document, &executor_types).expect("scenario 2 graph compiles")
}

#[tokio::test]
async fn scenario2_clarification_loop_preserves_session_id() {
    let graph = scenario2_graph();
    let session_opts = opts(serde_json::json!({"sessionId": "s1"}));

    let implement = ScriptedExecutor::new(
        "implement",
        &["ask_user", "success"],
        vec![
            result_with_opts("ask_user", OptsMap::new(), Some(session_opts.clone())),
            ExecutorResult::new(ResultType::from("success")),
        ],
    );
    let await_reply = ScriptedExecutor::new(
        "await_reply",
        &["waiting", "replied"],
        vec![ExecutorResult::waiting(), result_with_opts("replied", OptsMap::new(), Some(session_opts.clone()))],
    );

    struct RecordingEffect {
        fired: Mutex<u32>,
    }
    #[async_trait]
    impl Effect for RecordingEffect {
        async fn run(&self, _run: &IssueRun, _result: &ExecutorResult, _ctx: &Context) {
            *self.fired.lock().expect("lock") += 1;
        }
    }
    let question_effect = Arc::new(RecordingEffect { fired: Mutex::new(0) });

    let mut executors = ExecutorRegistry::new();
    executors.register(Arc::clone(&implement));
    executors.register(Arc::clone(&await_reply));

    let context_providers = ContextProviderRegistry::new();
    let mut effects = EffectRegistry::new();
    effects.register("implement", "ask_user", question_effect.clone());

    let (url, batches, server) = run_mock_ledger(5);
    let ledger = ledger_at(&url);
    let board: Arc<dyn BoardAdapter> = Arc::new(RecordingBoard::default());

    let run = process_run(&graph, &executors, &context_providers, &effects, &ledger, &board, sample_run("Build")).await;
    assert_eq!(run.pending_act.as_ref().map(|act| act.name.as_str()), Some("AwaitReply"));
    assert_eq!(run.latest_outcome.as_deref(), Some("NeedsClarification"));
    assert_eq!(*question_effect.fired.lock().expect("lock"), 1, "the ask_user effect should fire exactly once");

    let run = process_run(&graph, &executors, &context_providers, &effects, &ledger, &board, run).await;
    server.join().expect("server thread joins");

    assert_eq!(run.pending_act, None);
    assert_eq!(run.latest_outcome.as_deref(), Some("Implemented"));
    assert_eq!(*question_effect.fired.lock().expect("lock"), 1, "replying should not refire the clarification effect");

    // the second `implement` invocation is the "act Implement re-emitted" step;
    // its context carries the sessionId `await_reply` attached to the Clarified edge.
    assert_eq!(implement.invocation_opts(1), session_opts);

    let batches = batches.lock().expect("lock");
    let run_id = run.id.to_string();
    assert_eq!(mirrored_outcome_names(&batches, &run_id), vec!["Building", "NeedsClarification", "Clarified", "Implemented"]);
}

// ============================================================================
// SECTION: Scenario 3 — Max-turns resume
// ============================================================================

fn scenario3_graph() -> Graph {
    let acts = BTreeMap::from([
        ("Build".to_string(), phase_group("Build", "Building", "Build", Some("Implement"))),
        ("Implement".to_string(), work_act("Implement", "implement", "Build", "max_turns", "Paused", "Build", Some("Implement"))),
    ]);
    let states = BTreeMap::from([("Building".to_string(), "inProgress".to_string()), ("Paused".to_string(), "inProgress".to_string())]);
    let document = GraphDocument { acts, states, initial_act: "Build".to_string() };
    let executor_types = BTreeMap::from([("implement".to_string(), BTreeSet::from(["max_turns".to_string()]))]);
    Graph::compile(&document, &executor_types).expect("scenario 3 graph compiles")
}

#[tokio::test]
async fn scenario3_max_turns_resume_carries_session_and_retry_count() {
    let graph = scenario3_graph();
    let round1 = opts(serde_json::json!({"sessionId": "s1", "retryCount": 1}));
    let round2 = opts(serde_json::json!({"sessionId": "s1", "retryCount": 2}));

    let implement = ScriptedExecutor::new(
        "implement",
        &["max_turns"],
        vec![
            result_with_opts("max_turns", OptsMap::new(), Some(round1.clone())),
            result_with_opts("max_turns", OptsMap::new(), Some(round2.clone())),
        ],
    );

    let mut executors = ExecutorRegistry::new();
    executors.register(Arc::clone(&implement));
    let context_providers = ContextProviderRegistry::new();
    let effects = EffectRegistry::new();
    let (url, batches, server) = run_mock_ledger(4);
    let ledger = ledger_at(&url);
    let board = Arc::new(RecordingBoard::default());
    let board_adapter: Arc<dyn BoardAdapter> = board.clone();

    let mut run = sample_run("Build");
    run.board_item = Some("item-1".to_string());

    let run = process_run(&graph, &executors, &context_providers, &effects, &ledger, &board_adapter, run).await;
    assert_eq!(run.pending_act.as_ref().map(|act| act.name.as_str()), Some("Implement"));
    assert_eq!(run.pending_act.as_ref().map(|act| act.opts.clone()), Some(round1.clone()));
    assert_eq!(run.latest_outcome.as_deref(), Some("Paused"));

    let run = process_run(&graph, &executors, &context_providers, &effects, &ledger, &board_adapter, run).await;
    drain_spawned_tasks().await;
    server.join().expect("server thread joins");

    assert_eq!(run.pending_act.as_ref().map(|act| act.opts.clone()), Some(round2));
    assert_eq!(implement.invocation_opts(1), round1, "the second invocation should see round 1's carried opts");

    let batches = batches.lock().expect("lock");
    assert_eq!(batches.len(), 4);

    // one sync for the Build group's own `created` edge, then one per
    // `max_turns` pause (round 1 and round 2) — all inProgress, never moving.
    let synced = board.synced.lock().expect("lock");
    assert_eq!(
        *synced,
        vec![BoardColumn::InProgress, BoardColumn::InProgress, BoardColumn::InProgress],
        "a max-turns pause never moves the board out of inProgress",
    );
}

// ============================================================================
// SECTION: Scenario 6 — Graph-violating executor
// ============================================================================

fn scenario6_graph() -> Graph {
    let acts = BTreeMap::from([
        ("Build".to_string(), phase_group("Build", "Building", "Build", Some("Worker"))),
        ("Worker".to_string(), work_act("Worker", "worker", "Build", "success", "Done", "Build", None)),
    ]);
    let states = BTreeMap::from([("Building".to_string(), "inProgress".to_string()), ("Done".to_string(), "done".to_string())]);
    let document = GraphDocument { acts, states, initial_act: "Build".to_string() };
    let executor_types = BTreeMap::from([("worker".to_string(), BTreeSet::from(["success".to_string()]))]);
    Graph::compile(&document, &executor_types).expect("scenario 6 graph compiles")
}

#[tokio::test]
async fn scenario6_undeclared_result_type_halts_with_no_events() {
    let graph = scenario6_graph();
    // "worker" declares only "success" but the stub returns "failure": a contract
    // violation `ExecutorRegistry::invoke` must refuse before any commit.
    let worker = ScriptedExecutor::new("worker", &["success"], vec![ExecutorResult::new(ResultType::from("failure"))]);

    let mut executors = ExecutorRegistry::new();
    executors.register(worker);
    let context_providers = ContextProviderRegistry::new();
    let effects = EffectRegistry::new();
    let (url, batches, server) = run_mock_ledger(2);
    let ledger = ledger_at(&url);
    let board = Arc::new(RecordingBoard::default());
    let board_adapter: Arc<dyn BoardAdapter> = board.clone();

    let mut run = sample_run("Build");
    run.board_item = Some("item-1".to_string());

    let run = process_run(&graph, &executors, &context_providers, &effects, &ledger, &board_adapter, run).await;
    drain_spawned_tasks().await;
    server.join().expect("server thread joins");

    assert_eq!(run.pending_act.as_ref().map(|act| act.name.as_str()), Some("Worker"), "the violating act is never advanced past");
    assert_eq!(run.latest_outcome.as_deref(), Some("Building"), "only the phase-group open committed before the violation");

    let batches = batches.lock().expect("lock");
    assert_eq!(batches.len(), 2, "the Build group open and its created-edge commit, nothing from Worker");
    assert!(
        batches.iter().flat_map(|batch| batch.outcomes.iter()).all(|outcome| outcome.name != "Done"),
        "a declared-type violation must not emit any outcome for the violating act"
    );

    let synced = board.synced.lock().expect("lock");
    assert_eq!(*synced, vec![BoardColumn::InProgress], "no board sync fires for the halted act");
}
