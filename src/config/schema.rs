//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a deployment run.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the deployer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DeployerConfig {
    /// Key material provisioning.
    pub keys: KeyStoreConfig,

    /// Chain connection settings.
    pub chain: ChainConfig,

    /// Block polling policy used while waiting for the next block.
    pub block_poll: BlockPollConfig,

    /// Contract artifact and invocation settings.
    pub contract: ContractConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Key store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KeyStoreConfig {
    /// Directory holding one empty file per key, named by the key.
    pub dir: PathBuf,

    /// Number of keys to provision.
    pub count: usize,
}

impl Default for KeyStoreConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("keys"),
            count: 1,
        }
    }
}

/// Chain connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Chain ID (31337 for local Hardhat/Anvil).
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Maximum time to wait for a transaction receipt, in seconds.
    pub confirmation_timeout_secs: u64,

    /// Hex private key of the deploying account. Falls back to the
    /// environment, then to the first development account.
    #[serde(skip_serializing)]
    pub deployer_private_key: Option<String>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8545".to_string(),
            chain_id: 31337,
            rpc_timeout_secs: 10,
            confirmation_timeout_secs: 120,
            deployer_private_key: None,
        }
    }
}

/// Bounded polling policy for block height changes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BlockPollConfig {
    /// Delay before the first re-poll, in milliseconds.
    pub initial_delay_ms: u64,

    /// Upper bound on the delay between polls, in milliseconds.
    pub max_delay_ms: u64,

    /// Give up waiting after this many seconds.
    pub timeout_secs: u64,
}

impl Default for BlockPollConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: 100,
            max_delay_ms: 2_000,
            timeout_secs: 60,
        }
    }
}

/// Contract artifact and invocation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Root of the Hardhat artifacts tree.
    pub artifacts_dir: PathBuf,

    /// Contract name, also the artifact file stem.
    pub name: String,

    /// Balance attached to the deployment, in ether.
    pub deploy_value: String,

    /// Read-only getter to encode and query after deployment.
    pub getter: String,

    /// Batch transfer function taking `(address[], uint256[])`.
    pub multisend_function: String,

    /// Amount sent to each wallet per multisend call, in ether.
    pub amount_per_wallet: String,

    /// Number of multisend calls to perform.
    pub rounds: u32,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: PathBuf::from("artifacts"),
            name: "MultiSend".to_string(),
            deploy_value: "1".to_string(),
            getter: "getOwner".to_string(),
            multisend_function: "multiSend".to_string(),
            amount_per_wallet: "1".to_string(),
            rounds: 1,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Write a Prometheus text snapshot here when the run ends.
    pub metrics_file: Option<PathBuf>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_target_local_node() {
        let config = DeployerConfig::default();
        assert_eq!(config.chain.rpc_url, "http://127.0.0.1:8545");
        assert_eq!(config.chain.chain_id, 31337);
        assert_eq!(config.keys.count, 1);
        assert_eq!(config.contract.name, "MultiSend");
        assert_eq!(config.contract.deploy_value, "1");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: DeployerConfig = toml::from_str(
            r#"
            [keys]
            count = 4

            [contract]
            rounds = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.keys.count, 4);
        assert_eq!(config.keys.dir, PathBuf::from("keys"));
        assert_eq!(config.contract.rounds, 3);
        assert_eq!(config.contract.getter, "getOwner");
        assert_eq!(config.block_poll.max_delay_ms, 2_000);
    }

    #[test]
    fn test_private_key_not_serialized() {
        let mut config = DeployerConfig::default();
        config.chain.deployer_private_key = Some("0xdead".to_string());
        let rendered = toml::to_string(&config).unwrap();
        assert!(!rendered.contains("0xdead"));
    }
}
