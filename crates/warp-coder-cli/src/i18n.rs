// warp-coder-cli/src/i18n.rs
// ============================================================================
// Module: CLI Internationalization Helpers
// Description: Provides message catalog and translation utilities for the CLI.
// Purpose: Centralize user-facing strings for future localization support.
// Dependencies: Standard library collections and formatting utilities.
// ============================================================================

//! ## Overview
//! The Warp Coder CLI stores user-facing strings in a small translation
//! catalog to enforce consistent messaging and to prepare for future locales.
//! All runtime output should be routed through the [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to the key itself to avoid panics.
//! - Placeholder substitutions preserve deterministic order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates (e.g., `"path"`).
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static catalog entries loaded into the localized message bundle.
const CATALOG_ITEMS: &[(&str, &str)] = &[
    ("main.version", "warp-coder {version}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
    ("common.project_root_failed", "Failed to resolve the current directory: {error}"),
    ("common.config_load_failed", "Failed to load config: {error}"),
    ("common.secrets_load_failed", "Failed to load .env secrets: {error}"),
    ("common.ledger_url_invalid", "Invalid ledger URL {url}: {error}"),
    ("common.ledger_client_failed", "Failed to build ledger client: {error}"),
    ("common.graph_read_failed", "Failed to read workflow document at {path}: {error}"),
    ("common.graph_parse_failed", "Failed to parse workflow document at {path}: {error}"),
    ("common.graph_compile_failed", "Failed to compile workflow graph: {error}"),
    ("common.classification_register_failed", "Failed to register outcome classifications: {error}"),
    ("common.open_runs_failed", "Failed to query open runs: {error}"),
    ("init.already_exists", "init: {path} already exists; pass --force to overwrite"),
    ("init.write_failed", "init: failed to write {path}: {error}"),
    ("init.wrote", "init: wrote {path}"),
    ("watch.starting", "watch: polling every {interval}s, concurrency {concurrency}"),
    ("watch.shutdown.clean", "watch: shut down cleanly"),
    ("release.none_waiting", "release: no runs are awaiting deploy"),
    ("release.preview.batch", "release: batch {index} -> {runs}"),
    ("release.commit.batch", "release: released batch {index} ({count} run(s))"),
    ("release.commit.failed", "release: failed to release run {run}: {error}"),
    ("debug.new_run", "debug: no open run for issue {issue}; starting a new one"),
    ("debug.begin_failed", "Failed to start a new debug run: {error}"),
    ("debug.run.header", "debug: run {run} ({repo} #{number}) - {title}"),
    ("debug.run.act_history", "debug: {count} prior act(s) named {act} in the ledger"),
    ("debug.act_history_failed", "Failed to query act history: {error}"),
    ("debug.run.terminal", "debug: run closed, latest outcome {outcome}"),
    ("debug.run.stalled", "debug: run did not advance (ledger or contract failure); stopping"),
    ("debug.prompt.act", "{act} ({label})"),
    ("memory.empty", "(memory file is empty)"),
    ("memory.read_failed", "memory: failed to read memory file: {error}"),
    ("memory.compact_failed", "compact: failed to compact memory file: {error}"),
    ("compact.result", "compact: dropped {count} line(s)"),
];

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Translates `key` using the English fallback catalog while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

/// Returns the static English catalog used by the CLI.
fn catalog() -> &'static HashMap<&'static str, &'static str> {
    static CATALOG: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

    CATALOG.get_or_init(|| CATALOG_ITEMS.iter().copied().collect())
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a localized message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
///
/// # Returns
///
/// A localized [`String`] with placeholders substituted.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
