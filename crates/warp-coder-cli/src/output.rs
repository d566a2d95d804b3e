// warp-coder-cli/src/output.rs
// ============================================================================
// Module: CLI Output Helpers
// Description: Line writers routed through std::io::Write.
// Purpose: Give every CLI surface one shared way to talk to the terminal
//          without reaching for println!/eprintln! (denied workspace-wide).
// Dependencies: std::io
// ============================================================================

use std::io::Write;

use crate::t;

/// Writes a single line to stdout.
pub fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
pub fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized message describing a failed write to `stream`.
#[must_use]
pub fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream, error = error)
}
