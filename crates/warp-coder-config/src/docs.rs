// warp-coder-config/src/docs.rs
// ============================================================================
// Module: Config Docs Generator
// Description: Markdown generator for config.json documentation.
// Purpose: Keep the recognized-key table in sync with validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Generates `Docs/configuration/config.json.md`. The key/effect pairs
//! mirror the table in §6 verbatim; [`verify_config_docs`] lets a CI check
//! catch drift between this list and the committed file.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default output path for generated configuration docs.
const DOCS_PATH: &str = "Docs/configuration/config.json.md";

/// `(key, effect)` pairs documented for `config.json`, in table order (§6).
const RECOGNIZED_KEYS: &[(&str, &str)] = &[
    ("board.provider", "Selects board adapter (\"github\" project-style, \"linear\")"),
    ("board.project, board.owner, board.columns", "Adapter-specific"),
    ("repos", "Ordered list of repo URLs; first is primary"),
    ("pollInterval", "Seconds between poll cycles (default 30)"),
    ("concurrency", "Max simultaneous work acts (default 1)"),
    ("maxRevisions", "Revision retry cap (default 3)"),
    ("claude.maxTurns, claude.allowedTools, claude.disallowedTools", "Coder subprocess budget/permissions"),
    ("workflow", "Custom workflow document filename"),
    ("executors", "List of custom executor module paths"),
    ("memory.enabled, memory.maxLines", "Reflection memory toggles"),
    (
        "hooks.{onBranchCreate,onBeforePush,onPRCreated,onBeforeMerge,onMerged}",
        "Shell commands run with { ISSUE_NUMBER, PR_NUMBER, BRANCH, REPO } env",
    ),
];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when generating or verifying config docs.
#[derive(Debug, Error)]
pub enum DocsError {
    /// IO failure while writing or reading docs.
    #[error("docs io error: {0}")]
    Io(String),
    /// Generated docs do not match the committed file.
    #[error("docs drift: generated output does not match {0}")]
    Drift(String),
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Renders the configuration markdown documentation.
#[must_use]
pub fn config_docs_markdown() -> String {
    let mut out = String::new();
    out.push_str("<!-- Docs/configuration/config.json.md: generated, do not edit manually. -->\n\n");
    out.push_str("# config.json Configuration\n\n");
    out.push_str("Lives at `<projectRoot>/.warp-coder/config.json`; secrets live in a project-root `.env` (see `warp_coder_config::dotenv`).\n\n");
    out.push_str("| Key | Effect |\n|---|---|\n");
    for (key, effect) in RECOGNIZED_KEYS {
        out.push_str(&format!("| `{key}` | {effect} |\n"));
    }
    out
}

/// Writes the generated docs to [`DOCS_PATH`] under `root`.
///
/// # Errors
///
/// Returns [`DocsError::Io`] when the file cannot be written.
pub fn write_config_docs(root: &Path) -> Result<(), DocsError> {
    let path = root.join(DOCS_PATH);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| DocsError::Io(err.to_string()))?;
    }
    fs::write(&path, config_docs_markdown()).map_err(|err| DocsError::Io(err.to_string()))
}

/// Verifies the committed docs under `root` match the generated output.
///
/// # Errors
///
/// Returns [`DocsError::Io`] when the file cannot be read, or
/// [`DocsError::Drift`] when its contents differ from [`config_docs_markdown`].
pub fn verify_config_docs(root: &Path) -> Result<(), DocsError> {
    let path = root.join(DOCS_PATH);
    let committed = fs::read_to_string(&path).map_err(|err| DocsError::Io(err.to_string()))?;
    if committed != config_docs_markdown() {
        return Err(DocsError::Drift(path.display().to_string()));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use expect/unwrap for failure messages")]
mod tests {
    use super::config_docs_markdown;
    use super::verify_config_docs;
    use super::write_config_docs;

    #[test]
    fn markdown_documents_every_recognized_key() {
        let markdown = config_docs_markdown();
        for key in ["board.provider", "pollInterval", "concurrency", "maxRevisions", "workflow", "executors", "hooks."] {
            assert!(markdown.contains(key), "docs missing {key}");
        }
    }

    #[test]
    fn write_then_verify_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_config_docs(dir.path()).expect("write");
        verify_config_docs(dir.path()).expect("verify matches what was just written");
    }

    #[test]
    fn verify_detects_drift() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_config_docs(dir.path()).expect("write");
        std::fs::write(dir.path().join("Docs/configuration/config.json.md"), "stale").expect("overwrite");
        assert!(verify_config_docs(dir.path()).is_err());
    }
}
