//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     first SIGINT  → Shutdown::trigger
//!     second SIGINT → exit(130)
//!
//! Shutdown (shutdown.rs):
//!     watch flag → in-flight stage or block wait returns Cancelled
//!                → pipeline fails, process exits non-zero
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownListener};
pub use signals::spawn_ctrl_c_handler;
