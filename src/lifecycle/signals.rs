//! OS signal handling.
//!
//! The first Ctrl-C (SIGINT) triggers the shutdown signal so the current
//! stage returns `Cancelled` and the run unwinds normally. A second Ctrl-C
//! exits immediately with status 130.

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::Shutdown;

/// Exit status for a forced interrupt (128 + SIGINT).
pub const FORCED_EXIT_CODE: i32 = 130;

/// Spawn a task that triggers `shutdown` on Ctrl-C.
pub fn spawn_ctrl_c_handler(shutdown: Shutdown) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            return;
        }
        tracing::warn!("Interrupt received, cancelling run (press Ctrl-C again to force exit)");
        shutdown.trigger();

        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::error!("Second interrupt received, exiting");
            std::process::exit(FORCED_EXIT_CODE);
        }
    })
}
