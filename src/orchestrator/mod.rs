//! Run orchestration.
//!
//! # Data Flow
//! ```text
//! Idle ──keystore──→ KeysReady ──wallets──→ WalletsReady ──deploy──→ Deployed ──invoke──→ Done
//!   └──────────────────────────── any error ───────────────────────────────────────→ Failed
//! ```
//!
//! # Design Decisions
//! - Strictly linear, no retry or rollback
//! - Stage outputs are passed by value instead of kept in shared state

pub mod context;
pub mod pipeline;

pub use context::{Profile, RunReport, Stage};
pub use pipeline::{Orchestrator, PipelineError};
