// warp-coder-config/tests/config_validation.rs
// ============================================================================
// Suite: Config Load/Validate
// Description: End-to-end config.json loading against a real file on disk.
// ============================================================================

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "test assertions use expect/unwrap for failure messages")]

use std::fs;

use warp_coder_config::Config;
use warp_coder_config::ConfigError;
use warp_coder_config::config_json_example;

#[test]
fn loads_the_canonical_example_from_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, config_json_example()).expect("write example");

    let config = Config::load(&path).expect("example config loads");
    assert_eq!(config.repos, vec!["https://github.com/acme/widgets".to_string()]);
    assert_eq!(config.concurrency, 2);
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("does-not-exist.json");
    assert!(matches!(Config::load(&path), Err(ConfigError::Io(_))));
}

#[test]
fn malformed_json_is_a_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, "{ not json").expect("write");
    assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
}

#[test]
fn github_board_without_owner_is_rejected_at_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"board":{"provider":"github"},"repos":["https://github.com/acme/widgets"]}"#).expect("write");
    assert!(matches!(Config::load(&path), Err(ConfigError::Invalid(_))));
}

#[test]
fn project_root_resolution_joins_the_default_relative_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config_dir = dir.path().join(".warp-coder");
    fs::create_dir_all(&config_dir).expect("mkdir");
    fs::write(config_dir.join("config.json"), config_json_example()).expect("write");

    let config = Config::load_from_project_root(dir.path()).expect("loads via project root");
    assert_eq!(config.poll_interval, 30);
}
