// warp-coder-config/src/lib.rs
// ============================================================================
// Module: Warp Coder Config Library
// Description: Canonical config.json model, validation, and artifact generation.
// Purpose: Single source of truth for <projectRoot>/.warp-coder/config.json
//          and project-root .env secrets.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `warp-coder-config` loads and validates `config.json` (§6) and parses the
//! project-root `.env` secrets file. It provides deterministic generators for
//! the JSON schema, example config, and markdown docs so all three stay
//! anchored to the same recognized-key table.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod docs;
pub mod dotenv;
pub mod examples;
pub mod schema;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::BoardConfig;
pub use config::BoardProvider;
pub use config::ClaudeConfig;
pub use config::Config;
pub use config::ConfigError;
pub use config::HooksConfig;
pub use config::MemoryConfig;
pub use config::default_config_path;
pub use docs::DocsError;
pub use docs::config_docs_markdown;
pub use docs::verify_config_docs;
pub use docs::write_config_docs;
pub use dotenv::DotenvError;
pub use dotenv::Secrets;
pub use examples::config_json_example;
pub use schema::config_schema;
