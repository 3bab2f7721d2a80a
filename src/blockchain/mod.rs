//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! KeyRecords (keystore) ──→ wallet.rs (WalletSet, TransferPlan)
//! Deployer key (config/env) → wallet.rs → client.rs (RPC connection with timeouts)
//! Hardhat artifacts ──────→ artifact.rs (ABI + bytecode)
//!                            → deployer.rs (deploy, encode, call, read)
//!                            → transaction.rs (sign, broadcast, confirm)
//! ```
//!
//! # Security Constraints
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts
//! - Intended for local and test networks only

pub mod artifact;
pub mod client;
pub mod deployer;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use artifact::ContractArtifact;
pub use client::ChainClient;
pub use deployer::{ContractDeployer, ContractInterface, DeployedContract};
pub use types::{parse_ether_amount, BlockchainError, BlockchainResult, ChainId};
pub use wallet::{TransferPlan, Wallet, WalletSet};
