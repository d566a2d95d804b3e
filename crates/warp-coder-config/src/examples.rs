// warp-coder-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example config.json payload.
// Purpose: Deterministic example for docs, the `init` wizard, and tests.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`config_json_example`] parses and validates under [`crate::Config`]; a
//! unit test asserts this so the example cannot drift out of sync with the
//! schema it is meant to demonstrate.

/// Returns a canonical example `config.json`.
#[must_use]
pub fn config_json_example() -> String {
    String::from(
        r#"{
  "board": {
    "provider": "github",
    "owner": "acme",
    "project": "42"
  },
  "repos": [
    "https://github.com/acme/widgets"
  ],
  "pollInterval": 30,
  "concurrency": 2,
  "maxRevisions": 3,
  "claude": {
    "maxTurns": 40,
    "allowedTools": ["Bash", "Read", "Edit"],
    "disallowedTools": []
  },
  "memory": {
    "enabled": true,
    "maxLines": 500
  },
  "hooks": {
    "onPRCreated": "scripts/notify-pr.sh"
  }
}
"#,
    )
}
