// warp-coder-config/src/schema.rs
// ============================================================================
// Module: Config Schema
// Description: JSON Schema for config.json.
// Purpose: Give editors and the `init` wizard a machine-readable schema that
//          stays in sync with the `Config` struct's defaults and constraints.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! [`config_schema`] is hand-maintained rather than derived, since the
//! recognized-key table (§6) is small and stable; [`crate::docs`] documents
//! the same keys as markdown.

use serde_json::Value;
use serde_json::json;

/// Returns the JSON Schema (draft 2020-12) for `config.json`.
#[must_use]
pub fn config_schema() -> Value {
    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "Warp Coder config.json",
        "type": "object",
        "required": ["board", "repos"],
        "properties": {
            "board": {
                "type": "object",
                "required": ["provider"],
                "properties": {
                    "provider": { "type": "string", "enum": ["github", "linear"] },
                    "project": { "type": "string" },
                    "owner": { "type": "string" },
                    "columns": { "type": "object", "additionalProperties": { "type": "string" } }
                }
            },
            "repos": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": 1
            },
            "pollInterval": { "type": "integer", "minimum": 1, "default": 30 },
            "concurrency": { "type": "integer", "minimum": 1, "default": 1 },
            "maxRevisions": { "type": "integer", "minimum": 1, "default": 3 },
            "claude": {
                "type": "object",
                "properties": {
                    "maxTurns": { "type": "integer", "minimum": 1 },
                    "allowedTools": { "type": "array", "items": { "type": "string" } },
                    "disallowedTools": { "type": "array", "items": { "type": "string" } }
                }
            },
            "workflow": { "type": "string" },
            "executors": { "type": "array", "items": { "type": "string" } },
            "memory": {
                "type": "object",
                "properties": {
                    "enabled": { "type": "boolean", "default": true },
                    "maxLines": { "type": "integer", "minimum": 1, "default": 500 }
                }
            },
            "hooks": {
                "type": "object",
                "properties": {
                    "onBranchCreate": { "type": "string" },
                    "onBeforePush": { "type": "string" },
                    "onPRCreated": { "type": "string" },
                    "onBeforeMerge": { "type": "string" },
                    "onMerged": { "type": "string" }
                }
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use expect/unwrap for failure messages")]
mod tests {
    use super::config_schema;

    #[test]
    fn schema_names_every_top_level_recognized_key() {
        let schema = config_schema();
        let properties = schema["properties"].as_object().expect("object");
        for key in ["board", "repos", "pollInterval", "concurrency", "maxRevisions", "claude", "workflow", "executors", "memory", "hooks"] {
            assert!(properties.contains_key(key), "schema missing top-level key {key}");
        }
    }

    #[test]
    fn board_and_repos_are_required() {
        let schema = config_schema();
        let required = schema["required"].as_array().expect("array");
        assert!(required.iter().any(|value| value == "board"));
        assert!(required.iter().any(|value| value == "repos"));
    }
}
