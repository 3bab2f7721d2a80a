//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (counts and timeouts > 0)
//! - Check that ether amounts and the RPC URL parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DeployerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::utils::parse_ether;
use thiserror::Error;

use crate::config::schema::DeployerConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &DeployerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.keys.count == 0 {
        errors.push(ValidationError::new("keys.count", "must be at least 1"));
    }
    if config.keys.dir.as_os_str().is_empty() {
        errors.push(ValidationError::new("keys.dir", "must not be empty"));
    }

    if let Err(e) = config.chain.rpc_url.parse::<url::Url>() {
        errors.push(ValidationError::new(
            "chain.rpc_url",
            format!("invalid URL '{}': {}", config.chain.rpc_url, e),
        ));
    }
    if config.chain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("chain.rpc_timeout_secs", "must be greater than 0"));
    }
    if config.chain.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "chain.confirmation_timeout_secs",
            "must be greater than 0",
        ));
    }

    let poll = &config.block_poll;
    if poll.initial_delay_ms == 0 {
        errors.push(ValidationError::new("block_poll.initial_delay_ms", "must be greater than 0"));
    }
    if poll.initial_delay_ms > poll.max_delay_ms {
        errors.push(ValidationError::new(
            "block_poll.max_delay_ms",
            format!("must be >= initial_delay_ms ({})", poll.initial_delay_ms),
        ));
    }
    if poll.timeout_secs == 0 {
        errors.push(ValidationError::new("block_poll.timeout_secs", "must be greater than 0"));
    }

    let contract = &config.contract;
    for (field, value) in [
        ("contract.name", &contract.name),
        ("contract.getter", &contract.getter),
        ("contract.multisend_function", &contract.multisend_function),
    ] {
        if value.trim().is_empty() {
            errors.push(ValidationError::new(field, "must not be empty"));
        }
    }
    for (field, value) in [
        ("contract.deploy_value", &contract.deploy_value),
        ("contract.amount_per_wallet", &contract.amount_per_wallet),
    ] {
        if let Err(e) = parse_ether(value) {
            errors.push(ValidationError::new(field, format!("invalid ether amount '{}': {}", value, e)));
        }
    }
    if contract.rounds == 0 {
        errors.push(ValidationError::new("contract.rounds", "must be at least 1"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
