// warp-coder-config/src/dotenv.rs
// ============================================================================
// Module: .env Secrets
// Description: Dependency-free `.env` parser and known secret key lookup.
// Purpose: Load the project-root `.env` file's bearer tokens (§6) without
//          pulling in a full dotenv crate for a five-line format.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The format is intentionally minimal: one `KEY=VALUE` pair per line,
//! `#`-prefixed comment lines, blank lines ignored, no variable
//! interpolation, and an optional surrounding pair of single or double quotes
//! stripped from the value. [`Secrets::load`] reads the file (a missing file
//! is not an error: telemetry and every optional integration simply stay
//! disabled) and [`Secrets`] exposes the six recognized keys by name.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use thiserror::Error;

// ============================================================================
// SECTION: Known Keys
// ============================================================================

/// Ledger bearer token; absent disables telemetry and state tracking (warn only).
pub const WARPMETRICS_KEY: &str = "WARP_CODER_WARPMETRICS_KEY";
/// Ledger base URL override; absent falls back to the hosted default.
pub const LEDGER_URL: &str = "WARP_CODER_LEDGER_URL";
/// The hosted ledger service used when `WARP_CODER_LEDGER_URL` is unset.
pub const DEFAULT_LEDGER_URL: &str = "https://ledger.warpmetrics.com";
/// GitHub code-host token.
pub const GITHUB_TOKEN: &str = "WARP_CODER_GITHUB_TOKEN";
/// Token used to post review requests.
pub const REVIEW_TOKEN: &str = "WARP_CODER_REVIEW_TOKEN";
/// Linear board API key.
pub const LINEAR_KEY: &str = "WARP_CODER_LINEAR_KEY";
/// Changelog/release-notes host token.
pub const CHANGELOG_TOKEN: &str = "WARP_CODER_CHANGELOG_TOKEN";
/// Telegram notify bot token.
pub const TELEGRAM_BOT_TOKEN: &str = "WARP_CODER_TELEGRAM_BOT_TOKEN";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `.env` reading or parsing errors.
#[derive(Debug, Error)]
pub enum DotenvError {
    /// I/O failure other than a missing file.
    #[error(".env io error: {0}")]
    Io(String),
    /// A non-comment, non-blank line had no `=`.
    #[error(".env line {0} is not KEY=VALUE: {1}")]
    Malformed(usize, String),
}

// ============================================================================
// SECTION: Secrets
// ============================================================================

/// The subset of `.env` keys warp-coder recognizes, plus anything else found.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    /// Every key-value pair the file carried, recognized or not.
    values: BTreeMap<String, String>,
}

impl Secrets {
    /// Loads `.env` from `project_root`. A missing file yields empty secrets.
    ///
    /// # Errors
    ///
    /// Returns [`DotenvError`] when the file exists but cannot be read, or a
    /// line is neither blank, a comment, nor `KEY=VALUE`.
    pub fn load(project_root: &Path) -> Result<Self, DotenvError> {
        let path = project_root.join(".env");
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(DotenvError::Io(err.to_string())),
        };
        Self::parse(&contents)
    }

    /// Parses `.env` text directly (used by tests and [`Secrets::load`]).
    ///
    /// # Errors
    ///
    /// Returns [`DotenvError::Malformed`] on a line with no `=`.
    pub fn parse(contents: &str) -> Result<Self, DotenvError> {
        let mut values = BTreeMap::new();
        for (idx, raw_line) in contents.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(DotenvError::Malformed(idx + 1, raw_line.to_string()));
            };
            let key = key.trim().to_string();
            let value = unquote(value.trim());
            values.insert(key, value);
        }
        Ok(Self { values })
    }

    /// Looks up a key by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns the ledger bearer token, if set.
    #[must_use]
    pub fn ledger_bearer_token(&self) -> Option<&str> {
        self.get(WARPMETRICS_KEY)
    }

    /// Returns the ledger base URL: the override if set, else the hosted default.
    #[must_use]
    pub fn ledger_base_url(&self) -> &str {
        self.get(LEDGER_URL).unwrap_or(DEFAULT_LEDGER_URL)
    }
}

/// Strips one layer of matching surrounding quotes, if present.
fn unquote(value: &str) -> String {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return value[1..value.len() - 1].to_string();
        }
    }
    value.to_string()
}
