// warp-coder-cli/src/lib.rs
// ============================================================================
// Module: Warp Coder CLI Library
// Description: Shared helpers for the Warp Coder command-line interface.
// Purpose: Provide reusable components (i18n, output, the null board
//          adapter, the interactive debug executor) for the CLI binary.
// Dependencies: Standard library, warp-coder-adapters, warp-coder-core.
// ============================================================================

//! ## Overview
//! This library houses shared CLI utilities. The binary entry point
//! (`src/main.rs`) imports these helpers to keep every subcommand's output
//! and graph-driving logic consistent.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Internationalization helpers and message catalog.
pub mod i18n;

/// Interactive stand-in executor for the `debug` command.
pub mod interactive;

/// Coder/code-host/issues/git/notify adapters that reject every call.
pub mod null_adapters;

/// A `BoardAdapter` with no concrete project-tracking board behind it.
pub mod null_board;

/// stdout/stderr line writers shared by the binary and its submodules.
pub mod output;
