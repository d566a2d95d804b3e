// warp-coder-scheduler/src/shutdown.rs
// ============================================================================
// Module: Shutdown
// Description: Double-signal SIGINT/SIGTERM handling for the poll loop.
// Purpose: Let the first signal drain in-flight runs gracefully and force an
//          immediate exit on the second (§4.6 "Shutdown").
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! [`install`] spawns a task that listens for SIGINT/SIGTERM (Ctrl-C and
//! `tokio::signal::unix` on Unix) and flips a [`watch::Sender<bool>`] on the
//! first one, which [`crate::scheduler::Scheduler::run`] observes via
//! `shutdown_rx.changed()` to stop scheduling new cycles and drain in-flight
//! work. A second signal means the operator wants out now: it calls
//! `std::process::exit` directly rather than waiting on any future.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tokio::sync::watch;

// ============================================================================
// SECTION: Shutdown Watch
// ============================================================================

/// Installs the signal listener and returns the receiver half of its watch.
///
/// The returned receiver starts at `false`; it flips to `true` on the first
/// SIGINT or SIGTERM. A second signal of either kind exits the process
/// immediately with status 130, bypassing any graceful drain.
#[must_use]
pub fn install() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("shutdown signal received; draining in-flight runs");
        let _ = tx.send(true);

        wait_for_signal().await;
        tracing::warn!("second shutdown signal received; exiting immediately");
        std::process::exit(130);
    });
    rx
}

/// Waits for either a Ctrl-C or, on Unix, a SIGTERM.
#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::SignalKind;
    use tokio::signal::unix::signal;

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(err) => {
            tracing::error!(error = %err, "failed to install SIGTERM handler; falling back to Ctrl-C only");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

/// Waits for Ctrl-C on non-Unix targets.
#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
