// warp-coder-config/src/config.rs
// ============================================================================
// Module: Warp Coder Configuration
// Description: config.json loading, defaults, and fail-closed validation.
// Purpose: Single source of truth for <projectRoot>/.warp-coder/config.json.
// Dependencies: serde, serde_json, thiserror, std
// ============================================================================

//! ## Overview
//! Configuration is loaded from a JSON file with `#[serde(default)]` on every
//! optional key (§6). Missing or invalid configuration fails closed: an
//! unknown board provider, a non-positive `pollInterval`/`concurrency`/
//! `maxRevisions`, or an empty `repos` list is rejected at [`Config::load`]
//! rather than surfacing later as a confusing runtime failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default path, relative to the project root, of the config file.
pub const DEFAULT_CONFIG_PATH: &str = ".warp-coder/config.json";
/// Default seconds between poll cycles.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
/// Default maximum simultaneous work acts.
const DEFAULT_CONCURRENCY: usize = 1;
/// Default revision retry cap.
const DEFAULT_MAX_REVISIONS: u32 = 3;
/// Default reflection-memory line cap.
const DEFAULT_MEMORY_MAX_LINES: u32 = 500;
/// Maximum accepted config file size, guarding against a runaway read.
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// The full `config.json` document (§6).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Project-tracking board selection and adapter-specific fields.
    #[serde(default)]
    pub board: BoardConfig,
    /// Ordered repo URLs; the first is primary.
    #[serde(default)]
    pub repos: Vec<String>,
    /// Seconds between poll cycles.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,
    /// Max simultaneous work acts.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Revision retry cap before a run is treated as failed.
    #[serde(default = "default_max_revisions")]
    pub max_revisions: u32,
    /// Coder subprocess budget and tool permissions.
    #[serde(default)]
    pub claude: ClaudeConfig,
    /// Custom workflow document filename, relative to the config directory.
    #[serde(default)]
    pub workflow: Option<String>,
    /// Custom executor module paths, loaded in addition to the builtins.
    #[serde(default)]
    pub executors: Vec<String>,
    /// Reflection memory toggles.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Shell hooks run on lifecycle events.
    #[serde(default)]
    pub hooks: HooksConfig,
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_max_revisions() -> u32 {
    DEFAULT_MAX_REVISIONS
}

impl Config {
    /// Loads and validates configuration from the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read, is not valid
    /// JSON, exceeds [`MAX_CONFIG_FILE_SIZE`], or fails [`Config::validate`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let metadata = fs::metadata(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        let config: Self = serde_json::from_slice(&bytes).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolves `<projectRoot>/.warp-coder/config.json` and loads it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] under the same conditions as [`Config::load`].
    pub fn load_from_project_root(project_root: &Path) -> Result<Self, ConfigError> {
        Self::load(&project_root.join(DEFAULT_CONFIG_PATH))
    }

    /// Validates the configuration for internal consistency (§6).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.board.validate()?;
        if self.repos.is_empty() {
            return Err(ConfigError::Invalid("repos must list at least one repository".to_string()));
        }
        if self.poll_interval == 0 {
            return Err(ConfigError::Invalid("pollInterval must be positive".to_string()));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be positive".to_string()));
        }
        if self.max_revisions == 0 {
            return Err(ConfigError::Invalid("maxRevisions must be positive".to_string()));
        }
        self.claude.validate()?;
        self.memory.validate()?;
        Ok(())
    }
}

/// Known project-tracking board providers (§6 `board.provider`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardProvider {
    /// GitHub Projects (v2)-style board.
    Github,
    /// Linear.
    Linear,
}

/// Board selection and adapter-specific settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardConfig {
    /// Selects the concrete board adapter.
    pub provider: BoardProvider,
    /// Adapter-specific project identifier (e.g. a GitHub Projects number).
    #[serde(default)]
    pub project: Option<String>,
    /// Adapter-specific owner (organization or user login).
    #[serde(default)]
    pub owner: Option<String>,
    /// Adapter-specific column name overrides, keyed by [`BoardColumn`] symbol.
    #[serde(default)]
    pub columns: std::collections::BTreeMap<String, String>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self { provider: BoardProvider::Github, project: None, owner: None, columns: std::collections::BTreeMap::new() }
    }
}

impl BoardConfig {
    /// Validates the board section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a required adapter field is
    /// missing for the selected provider.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider == BoardProvider::Github && self.owner.is_none() {
            return Err(ConfigError::Invalid("board.owner is required for the github provider".to_string()));
        }
        Ok(())
    }
}

/// Coder subprocess budget and tool permissions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaudeConfig {
    /// Maximum turns the coder subprocess may take per invocation.
    #[serde(default)]
    pub max_turns: Option<u32>,
    /// Tool names the coder subprocess is permitted to use.
    #[serde(default)]
    pub allowed_tools: Vec<String>,
    /// Tool names the coder subprocess is forbidden to use.
    #[serde(default)]
    pub disallowed_tools: Vec<String>,
}

impl ClaudeConfig {
    /// Validates the coder subprocess budget.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `maxTurns` is zero, or the same
    /// tool name appears in both the allow and deny lists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_turns == Some(0) {
            return Err(ConfigError::Invalid("claude.maxTurns must be positive when set".to_string()));
        }
        for tool in &self.allowed_tools {
            if self.disallowed_tools.contains(tool) {
                return Err(ConfigError::Invalid(format!("claude: tool '{tool}' is both allowed and disallowed")));
            }
        }
        Ok(())
    }
}

/// Reflection memory toggles.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryConfig {
    /// Whether reflection memory is written and consulted at all.
    #[serde(default = "default_memory_enabled")]
    pub enabled: bool,
    /// Maximum memory file lines before compaction is forced.
    #[serde(default = "default_memory_max_lines")]
    pub max_lines: u32,
}

fn default_memory_enabled() -> bool {
    true
}

fn default_memory_max_lines() -> u32 {
    DEFAULT_MEMORY_MAX_LINES
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { enabled: default_memory_enabled(), max_lines: default_memory_max_lines() }
    }
}

impl MemoryConfig {
    /// Validates the memory section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `maxLines` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.max_lines == 0 {
            return Err(ConfigError::Invalid("memory.maxLines must be positive when memory is enabled".to_string()));
        }
        Ok(())
    }
}

/// Shell commands run on lifecycle events, each receiving `ISSUE_NUMBER`,
/// `PR_NUMBER`, `BRANCH`, and `REPO` in its environment (§6).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HooksConfig {
    /// Runs after a work branch is created.
    #[serde(default)]
    pub on_branch_create: Option<String>,
    /// Runs before a branch is pushed.
    #[serde(default)]
    pub on_before_push: Option<String>,
    /// Runs after a pull request is opened.
    #[serde(default)]
    pub on_pr_created: Option<String>,
    /// Runs before a pull request is merged.
    #[serde(default)]
    pub on_before_merge: Option<String>,
    /// Runs after a pull request is merged.
    #[serde(default)]
    pub on_merged: Option<String>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading the config file.
    #[error("config io error: {0}")]
    Io(String),
    /// JSON parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Returns the default config path under a project root, without loading it.
#[must_use]
pub fn default_config_path(project_root: &Path) -> PathBuf {
    project_root.join(DEFAULT_CONFIG_PATH)
}
