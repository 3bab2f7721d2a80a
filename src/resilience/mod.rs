//! Resilience helpers.
//!
//! # Data Flow
//! ```text
//! Waiting on chain progress:
//!     → backoff.rs (delay between block height polls)
//!     → bounded by block_poll.timeout_secs and the shutdown signal
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every wait has a deadline
//! - Transactions are never retried; a failed send aborts the run

pub mod backoff;

pub use backoff::{calculate_backoff, Backoff};
