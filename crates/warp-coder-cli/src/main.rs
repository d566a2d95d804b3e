#![cfg_attr(
    test,
    allow(
        clippy::panic,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::use_debug,
        clippy::dbg_macro,
        clippy::panic_in_result_fn,
        clippy::unwrap_in_result,
        reason = "Test-only output and panic-based assertions are permitted."
    )
)]
// warp-coder-cli/src/main.rs
// ============================================================================
// Module: Warp Coder CLI Entry Point
// Description: Command dispatcher for the workflow daemon and its
//              operator-facing utilities.
// Purpose: Wire the compiled graph, ledger client, and registries together
//          behind `init`/`watch`/`release`/`debug`/`memory`/`compact`.
// Dependencies: clap, tokio, tracing, warp-coder-{adapters,builtins,config,
//               core,ledger,scheduler}.
// ============================================================================

//! ## Overview
//! This binary never implements workflow logic itself: every subcommand
//! loads `config.json`/`.env`, builds the collaborators `warp-coder-scheduler`
//! and `warp-coder-builtins` already define, and dispatches into them.
//! `watch` runs the long-lived poll loop; `release` previews or commits a
//! deploy batch; `debug` drives a single run interactively at a terminal;
//! `memory`/`compact` inspect and trim the reflection memory file; `init`
//! scaffolds a starter `config.json`.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use thiserror::Error;
use url::Url;
use warp_coder_adapters::BoardAdapter;
use warp_coder_adapters::ContextProviderRegistry;
use warp_coder_adapters::NotifyClient;
use warp_coder_builtins::BuiltinAdapters;
use warp_coder_builtins::MemoryStore;
use warp_coder_builtins::default_context_providers;
use warp_coder_builtins::default_graph_document;
use warp_coder_builtins::default_graph_executor_result_types;
use warp_coder_builtins::default_registry;
use warp_coder_builtins::deploy_batch::DeployCandidate;
use warp_coder_builtins::deploy_batch::compute_deploy_batch;
use warp_coder_builtins::graph_document::DEPLOY_GROUP;
use warp_coder_cli::interactive::interactive_executors;
use warp_coder_cli::null_adapters::NullCoderClient;
use warp_coder_cli::null_adapters::NullCodeHostAdapter;
use warp_coder_cli::null_adapters::NullGitClient;
use warp_coder_cli::null_adapters::NullIssuesClient;
use warp_coder_cli::null_adapters::NullNotifyClient;
use warp_coder_cli::null_board::NullBoardAdapter;
use warp_coder_cli::output::output_error;
use warp_coder_cli::output::write_stderr_line;
use warp_coder_cli::output::write_stdout_line;
use warp_coder_cli::t;
use warp_coder_config::Config;
use warp_coder_config::Secrets;
use warp_coder_config::config_json_example;
use warp_coder_config::default_config_path;
use warp_coder_core::ExecutorRegistry;
use warp_coder_core::IssueId;
use warp_coder_core::IssueRunId;
use warp_coder_core::PhaseGroupId;
use warp_coder_core::Timestamp;
use warp_coder_core::entities::ContainerId;
use warp_coder_core::entities::IssueRun;
use warp_coder_core::entities::OptsMap;
use warp_coder_core::entities::PendingAct;
use warp_coder_core::graph::Graph;
use warp_coder_core::graph::document::GraphDocument;
use warp_coder_core::names::ActName;
use warp_coder_core::names::Classification;
use warp_coder_core::names::OutcomeName;
use warp_coder_ledger::LedgerClient;
use warp_coder_ledger::LedgerError;
use warp_coder_ledger::OpenIssueRun;
use warp_coder_scheduler::EffectRegistry;
use warp_coder_scheduler::Scheduler;
use warp_coder_scheduler::default_effects;
use warp_coder_scheduler::install_shutdown_watch;
use warp_coder_scheduler::process_run;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "warp-coder", disable_help_subcommand = true, arg_required_else_help = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Scaffolds a starter `.warp-coder/config.json`.
    Init(InitCommand),
    /// Runs the long-lived poll loop.
    Watch(WatchCommand),
    /// Previews or commits the next deploy batch.
    Release(ReleaseCommand),
    /// Drives a single run interactively at a terminal.
    Debug(DebugCommand),
    /// Prints the reflection memory file.
    Memory(ProjectRootCommand),
    /// Trims the reflection memory file to its configured line cap.
    Compact(ProjectRootCommand),
}

/// Arguments shared by commands that only need a project root.
#[derive(Args, Debug)]
struct ProjectRootCommand {
    /// Project root directory (defaults to the current directory).
    #[arg(long, value_name = "DIR")]
    project_root: Option<PathBuf>,
}

/// Arguments for the `init` command.
#[derive(Args, Debug)]
struct InitCommand {
    /// Project root directory (defaults to the current directory).
    #[arg(long, value_name = "DIR")]
    project_root: Option<PathBuf>,
    /// Overwrite an existing config file.
    #[arg(long)]
    force: bool,
}

/// Arguments for the `watch` command.
#[derive(Args, Debug)]
struct WatchCommand {
    /// Project root directory (defaults to the current directory).
    #[arg(long, value_name = "DIR")]
    project_root: Option<PathBuf>,
}

/// Arguments for the `release` command.
#[derive(Args, Debug)]
struct ReleaseCommand {
    /// Project root directory (defaults to the current directory).
    #[arg(long, value_name = "DIR")]
    project_root: Option<PathBuf>,
    /// Print the batches that would be released without committing them.
    #[arg(long)]
    preview: bool,
}

/// Arguments for the `debug` command.
#[derive(Args, Debug)]
struct DebugCommand {
    /// Project root directory (defaults to the current directory).
    #[arg(long, value_name = "DIR")]
    project_root: Option<PathBuf>,
    /// Existing open run's board issue id to resume; starts a new run if absent.
    #[arg(long, value_name = "ISSUE_ID")]
    issue_id: Option<String>,
    /// Title for a newly started run (ignored when resuming).
    #[arg(long, value_name = "TITLE", default_value = "debug run")]
    title: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self { message }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Init(command) => command_init(command),
        Commands::Watch(command) => command_watch(command).await,
        Commands::Release(command) => command_release(command).await,
        Commands::Debug(command) => command_debug(command).await,
        Commands::Memory(command) => command_memory(command),
        Commands::Compact(command) => command_compact(command),
    }
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

// ============================================================================
// SECTION: Shared Loading Helpers
// ============================================================================

/// Resolves a project root argument, defaulting to the current directory.
fn resolve_project_root(project_root: Option<PathBuf>) -> CliResult<PathBuf> {
    match project_root {
        Some(path) => Ok(path),
        None => std::env::current_dir().map_err(|err| CliError::new(t!("common.project_root_failed", error = err))),
    }
}

/// Loads `config.json` and `.env` secrets from a project root.
fn load_config_and_secrets(project_root: &Path) -> CliResult<(Config, Secrets)> {
    let config = Config::load_from_project_root(project_root)
        .map_err(|err| CliError::new(t!("common.config_load_failed", error = err)))?;
    let secrets =
        Secrets::load(project_root).map_err(|err| CliError::new(t!("common.secrets_load_failed", error = err)))?;
    Ok((config, secrets))
}

/// Builds a ledger client from loaded secrets.
fn build_ledger_client(secrets: &Secrets) -> CliResult<Arc<LedgerClient>> {
    let base_url = secrets.ledger_base_url();
    let url: Url = base_url
        .parse()
        .map_err(|err| CliError::new(t!("common.ledger_url_invalid", url = base_url, error = err)))?;
    let client = LedgerClient::new(url, secrets.ledger_bearer_token().map(str::to_string))
        .map_err(|err| CliError::new(t!("common.ledger_client_failed", error = err)))?;
    Ok(Arc::new(client))
}

/// Loads the workflow document named by `config.workflow`, or the shipped
/// default if no override is configured.
fn load_graph_document(project_root: &Path, config: &Config) -> CliResult<GraphDocument> {
    let Some(filename) = &config.workflow else {
        return Ok(default_graph_document());
    };
    let path = project_root.join(".warp-coder").join(filename);
    let bytes = std::fs::read_to_string(&path)
        .map_err(|err| CliError::new(t!("common.graph_read_failed", path = path.display(), error = err)))?;
    serde_json::from_str(&bytes)
        .map_err(|err| CliError::new(t!("common.graph_parse_failed", path = path.display(), error = err)))
}

/// Registers every built-in outcome classification with the ledger.
async fn register_classifications(ledger: &Arc<LedgerClient>) -> CliResult<()> {
    let ledger = Arc::clone(ledger);
    tokio::task::spawn_blocking(move || {
        let classifications: Vec<(String, Classification)> =
            OutcomeName::all().into_iter().map(|outcome| (outcome.as_str().to_string(), outcome.classification())).collect();
        ledger.register_classifications(&classifications)
    })
    .await
    .map_err(|err| CliError::new(t!("common.classification_register_failed", error = err)))?
    .map_err(|err| CliError::new(t!("common.classification_register_failed", error = err)))
}

/// Queries every open issue run from the ledger.
async fn find_open_issue_runs(ledger: &Arc<LedgerClient>) -> CliResult<Vec<OpenIssueRun>> {
    let ledger = Arc::clone(ledger);
    tokio::task::spawn_blocking(move || ledger.find_open_issue_runs())
        .await
        .map_err(|err| CliError::new(t!("common.open_runs_failed", error = err)))?
        .map_err(|err| CliError::new(t!("common.open_runs_failed", error = err)))
}

/// Projects a ledger-reported open run into the working entity `processRun` advances.
fn issue_run_from_open(open: OpenIssueRun) -> IssueRun {
    IssueRun {
        id: open.id,
        issue_id: open.issue_id,
        issue_number: open.issue_number,
        repo: open.repo,
        title: open.title,
        latest_outcome: open.latest_outcome,
        pending_act: open.pending_act,
        groups: open.groups,
        board_item: None,
    }
}

// ============================================================================
// SECTION: Init Command
// ============================================================================

/// Executes the `init` command.
fn command_init(command: InitCommand) -> CliResult<ExitCode> {
    let project_root = resolve_project_root(command.project_root)?;
    let path = default_config_path(&project_root);
    if path.exists() && !command.force {
        write_stderr_line(&t!("init.already_exists", path = path.display()))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
        return Ok(ExitCode::FAILURE);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|err| CliError::new(t!("init.write_failed", path = path.display(), error = err)))?;
    }
    std::fs::write(&path, config_json_example())
        .map_err(|err| CliError::new(t!("init.write_failed", path = path.display(), error = err)))?;
    write_stdout_line(&t!("init.wrote", path = path.display())).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Watch Command
// ============================================================================

/// Executes the `watch` command: runs the poll loop until shutdown.
async fn command_watch(command: WatchCommand) -> CliResult<ExitCode> {
    let project_root = resolve_project_root(command.project_root)?;
    let (config, secrets) = load_config_and_secrets(&project_root)?;
    let ledger = build_ledger_client(&secrets)?;
    register_classifications(&ledger).await?;

    let document = load_graph_document(&project_root, &config)?;
    let adapters = BuiltinAdapters {
        coder: Arc::new(NullCoderClient),
        code_host: Arc::new(NullCodeHostAdapter),
        issues: Arc::new(NullIssuesClient),
        git: Arc::new(NullGitClient),
        notify: Arc::new(NullNotifyClient),
    };
    let executors = default_registry(&adapters);
    let declared = default_graph_executor_result_types(&executors.result_types_index());
    let graph = Graph::compile(&document, &declared).map_err(|err| CliError::new(t!("common.graph_compile_failed", error = err)))?;

    let context_providers = default_context_providers(Arc::clone(&ledger));
    let effects = default_effects(Arc::clone(&adapters.notify) as Arc<dyn NotifyClient>);
    let board: Arc<dyn BoardAdapter> = Arc::new(NullBoardAdapter);

    write_stdout_line(&t!("watch.starting", interval = config.poll_interval, concurrency = config.concurrency))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;

    let scheduler = Arc::new(Scheduler::new(
        graph,
        executors,
        context_providers,
        effects,
        ledger,
        board,
        config.concurrency,
        Duration::from_secs(config.poll_interval),
    ));
    let shutdown_rx = install_shutdown_watch();
    scheduler.run(shutdown_rx).await;

    write_stdout_line(&t!("watch.shutdown.clean")).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Release Command
// ============================================================================

/// Executes the `release` command: batches every run awaiting deploy.
async fn command_release(command: ReleaseCommand) -> CliResult<ExitCode> {
    let project_root = resolve_project_root(command.project_root)?;
    let (_config, secrets) = load_config_and_secrets(&project_root)?;
    let ledger = build_ledger_client(&secrets)?;

    let open_runs = find_open_issue_runs(&ledger).await?;
    let awaiting: Vec<OpenIssueRun> = open_runs
        .into_iter()
        .filter(|run| run.pending_act.as_ref().is_some_and(|act| act.name == ActName::AwaitDeploy.as_str()))
        .collect();

    if awaiting.is_empty() {
        write_stdout_line(&t!("release.none_waiting")).map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let candidates: Vec<DeployCandidate> =
        awaiting.iter().map(|run| DeployCandidate { run_id: run.id.clone(), repos: BTreeSet::from([run.repo.clone()]) }).collect();

    let mut remaining: BTreeSet<IssueRunId> = candidates.iter().map(|candidate| candidate.run_id.clone()).collect();
    let mut batches = Vec::new();
    while let Some(trigger) = remaining.iter().next().cloned() {
        let batch = compute_deploy_batch(&trigger, &candidates);
        for run_id in &batch {
            remaining.remove(run_id);
        }
        batches.push(batch);
    }

    if command.preview {
        for (index, batch) in batches.iter().enumerate() {
            let runs = batch.iter().map(IssueRunId::to_string).collect::<Vec<_>>().join(", ");
            write_stdout_line(&t!("release.preview.batch", index = index + 1, runs = runs))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
        return Ok(ExitCode::SUCCESS);
    }

    for (index, batch) in batches.iter().enumerate() {
        release_batch(&ledger, &awaiting, batch, index + 1).await?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Commits the `AwaitingDeploy`/`RunDeploy` transition for every run in a batch.
async fn release_batch(
    ledger: &Arc<LedgerClient>,
    awaiting: &[OpenIssueRun],
    batch: &BTreeSet<IssueRunId>,
    index: usize,
) -> CliResult<()> {
    let ledger = Arc::clone(ledger);
    let run_ids: Vec<IssueRunId> = batch.iter().cloned().collect();
    let deploy_group_ids: Vec<PhaseGroupId> = run_ids
        .iter()
        .filter_map(|run_id| awaiting.iter().find(|run| &run.id == run_id))
        .filter_map(|run| run.groups.get(DEPLOY_GROUP).cloned())
        .collect();

    let result = tokio::task::spawn_blocking(move || {
        let now = Timestamp::now();
        let mut commit = ledger.begin_batch();
        for group_id in &deploy_group_ids {
            let outcome_id = commit.batch_outcome(&ContainerId::PhaseGroup(group_id.clone()), OutcomeName::AwaitingDeploy.as_str(), &OptsMap::new(), now);
            commit.batch_act(&outcome_id, ActName::RunDeploy.as_str(), &OptsMap::new(), now);
        }
        commit.flush()
    })
    .await
    .map_err(|err| CliError::new(t!("release.commit.failed", run = index, error = err)))?;

    result.map_err(|err| CliError::new(t!("release.commit.failed", run = index, error = err)))?;
    write_stdout_line(&t!("release.commit.batch", index = index, count = batch.len()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Debug Command
// ============================================================================

/// Executes the `debug` command: drives one run interactively at a terminal.
async fn command_debug(command: DebugCommand) -> CliResult<ExitCode> {
    let project_root = resolve_project_root(command.project_root)?;
    let (config, secrets) = load_config_and_secrets(&project_root)?;
    let ledger = build_ledger_client(&secrets)?;
    register_classifications(&ledger).await?;

    let document = load_graph_document(&project_root, &config)?;
    let graph = Arc::new(Graph::compile(&document, &BTreeMap::new()).map_err(|err| CliError::new(t!("common.graph_compile_failed", error = err)))?);

    let mut executors = ExecutorRegistry::new();
    for executor in interactive_executors(&graph) {
        executors.register(executor);
    }

    let run = resolve_debug_run(&ledger, &graph, command.issue_id.as_deref(), &command.title).await?;
    write_stdout_line(&t!("debug.run.header", run = run.id.to_string(), repo = run.repo.as_str(), number = run.issue_number, title = run.title.as_str()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    report_act_history(&ledger, run.pending_act.as_ref()).await?;

    let context_providers = ContextProviderRegistry::new();
    let effects = EffectRegistry::new();
    let board: Arc<dyn BoardAdapter> = Arc::new(NullBoardAdapter);

    let pending_act_before = run.pending_act.clone();
    let finished = process_run(&graph, &executors, &context_providers, &effects, &ledger, &board, run).await;

    if finished.pending_act.is_none() {
        let outcome = finished.latest_outcome.as_deref().unwrap_or("none");
        write_stdout_line(&t!("debug.run.terminal", outcome = outcome)).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    } else if finished.pending_act == pending_act_before {
        write_stdout_line(&t!("debug.run.stalled")).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Resolves the run a `debug` invocation should drive: an existing open run
/// matching `issue_id`, or a freshly seeded one.
async fn resolve_debug_run(ledger: &Arc<LedgerClient>, graph: &Arc<Graph>, issue_id: Option<&str>, title: &str) -> CliResult<IssueRun> {
    if let Some(issue_id) = issue_id {
        let open_runs = find_open_issue_runs(ledger).await?;
        if let Some(existing) = open_runs.into_iter().find(|run| run.issue_id.as_str() == issue_id) {
            return Ok(issue_run_from_open(existing));
        }
        write_stdout_line(&t!("debug.new_run", issue = issue_id)).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }

    let issue_id = issue_id.unwrap_or("debug-issue").to_string();
    let title = title.to_string();
    let initial_act = graph.initial_act().to_string();
    let ledger = Arc::clone(ledger);
    let result = tokio::task::spawn_blocking(move || begin_debug_run(&ledger, &issue_id, &title, &initial_act))
        .await
        .map_err(|err| CliError::new(t!("debug.begin_failed", error = err)))?;
    result.map_err(|err| CliError::new(t!("debug.begin_failed", error = err)))
}

/// Prints how many acts the ledger has recorded under the current pending
/// act's name, across every run, as an operator aid (§6 `GET /v1/acts?name=…`).
async fn report_act_history(ledger: &Arc<LedgerClient>, pending_act: Option<&PendingAct>) -> CliResult<()> {
    let Some(pending_act) = pending_act else {
        return Ok(());
    };
    let act_name = pending_act.name.clone();
    let ledger = Arc::clone(ledger);
    let history = tokio::task::spawn_blocking(move || ledger.find_acts_by_name(&act_name))
        .await
        .map_err(|err| CliError::new(t!("debug.act_history_failed", error = err)))?
        .map_err(|err| CliError::new(t!("debug.act_history_failed", error = err)))?;
    write_stdout_line(&t!("debug.run.act_history", act = pending_act.name.as_str(), count = history.len()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Seeds a brand-new issue run for the `debug` command, matching the
/// scheduler's own `beginRun` sequence (queue a run, a `Started` outcome,
/// and its initial act, then flush once).
fn begin_debug_run(ledger: &LedgerClient, issue_id: &str, title: &str, initial_act: &str) -> Result<IssueRun, LedgerError> {
    let now = Timestamp::now();
    let mut batch = ledger.begin_batch();
    let issue = IssueId::new(issue_id);
    let run_id = batch.batch_run(&issue, 0, "local/debug", title, now);
    let outcome_id = batch.batch_outcome(&ContainerId::IssueRun(run_id.clone()), OutcomeName::Started.as_str(), &OptsMap::new(), now);
    let act_id = batch.batch_act(&outcome_id, initial_act, &OptsMap::new(), now);
    batch.flush()?;

    Ok(IssueRun {
        id: run_id,
        issue_id: issue,
        issue_number: 0,
        repo: "local/debug".to_string(),
        title: title.to_string(),
        latest_outcome: Some(OutcomeName::Started.as_str().to_string()),
        pending_act: Some(PendingAct { id: act_id, name: initial_act.to_string(), opts: OptsMap::new() }),
        groups: BTreeMap::new(),
        board_item: None,
    })
}

// ============================================================================
// SECTION: Memory Commands
// ============================================================================

/// Executes the `memory` command: prints the reflection memory file.
fn command_memory(command: ProjectRootCommand) -> CliResult<ExitCode> {
    let project_root = resolve_project_root(command.project_root)?;
    let store = MemoryStore::new(&project_root);
    let contents = store.read().map_err(|err| CliError::new(t!("memory.read_failed", error = err)))?;
    if contents.trim().is_empty() {
        write_stdout_line(&t!("memory.empty")).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    } else {
        write_stdout_line(contents.trim_end()).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes the `compact` command: trims the reflection memory file.
fn command_compact(command: ProjectRootCommand) -> CliResult<ExitCode> {
    let project_root = resolve_project_root(command.project_root)?;
    let (config, _secrets) = load_config_and_secrets(&project_root)?;
    let store = MemoryStore::new(&project_root);
    let dropped = store.compact(config.memory.max_lines).map_err(|err| CliError::new(t!("memory.compact_failed", error = err)))?;
    write_stdout_line(&t!("compact.result", count = dropped)).map_err(|err| CliError::new(output_error("stdout", &err)))
}
