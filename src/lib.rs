//! MultiSend deployment and batch-transfer tooling for local EVM nodes.

pub mod blockchain;
pub mod config;
pub mod error;
pub mod keystore;
pub mod lifecycle;
pub mod observability;
pub mod orchestrator;
pub mod resilience;

pub use config::DeployerConfig;
pub use error::AppError;
pub use lifecycle::Shutdown;
pub use orchestrator::{Orchestrator, PipelineError, Profile, RunReport, Stage};
