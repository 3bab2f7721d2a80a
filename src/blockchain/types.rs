//! Chain-specific types and error definitions.

use thiserror::Error;

pub use crate::config::schema::{BlockPollConfig, ChainConfig};

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Invalid private key format or derivation error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// No build artifact with the requested contract name.
    #[error("Contract artifact '{name}' not found under {dir}")]
    ArtifactNotFound { name: String, dir: String },

    /// Artifact file exists but cannot be read or parsed.
    #[error("Invalid contract artifact {path}: {reason}")]
    Artifact { path: String, reason: String },

    /// ABI lookup, encoding or decoding failed.
    #[error("ABI error: {0}")]
    Abi(String),

    /// Deployment did not produce a contract.
    #[error("Deployment failed: {0}")]
    Deployment(String),

    /// Transaction was reverted on-chain.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// An ether amount could not be parsed.
    #[error("Invalid amount '{value}': {reason}")]
    InvalidAmount { value: String, reason: String },

    /// Block height did not change within the poll timeout.
    #[error("No new block after {0} seconds")]
    BlockWaitTimeout(u64),

    /// Wait was interrupted by a shutdown signal.
    #[error("Operation cancelled")]
    Cancelled,
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Parse a decimal ether amount (e.g. "1", "0.5") into wei.
pub fn parse_ether_amount(value: &str) -> BlockchainResult<alloy::primitives::U256> {
    alloy::primitives::utils::parse_ether(value).map_err(|e| BlockchainError::InvalidAmount {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;

    #[test]
    fn test_chain_id_conversion() {
        let chain_id = ChainId::from(31337u64);
        assert_eq!(chain_id.0, 31337);
        assert_eq!(u64::from(chain_id), 31337);
    }

    #[test]
    fn test_error_display() {
        let err = BlockchainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = BlockchainError::ArtifactNotFound {
            name: "MultiSend".to_string(),
            dir: "artifacts".to_string(),
        };
        assert!(err.to_string().contains("MultiSend"));
    }

    #[test]
    fn test_parse_ether_amount() {
        assert_eq!(
            parse_ether_amount("1").unwrap(),
            U256::from(1_000_000_000_000_000_000u128)
        );
        assert_eq!(
            parse_ether_amount("0.5").unwrap(),
            U256::from(500_000_000_000_000_000u128)
        );
        assert!(matches!(
            parse_ether_amount("lots"),
            Err(BlockchainError::InvalidAmount { .. })
        ));
    }
}
