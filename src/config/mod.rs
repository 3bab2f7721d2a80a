//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → DeployerConfig (validated, immutable for the run)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the run starts
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::{
    BlockPollConfig, ChainConfig, ContractConfig, DeployerConfig, KeyStoreConfig,
    ObservabilityConfig,
};
pub use validation::{validate_config, ValidationError};
