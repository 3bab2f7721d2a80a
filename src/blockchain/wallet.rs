//! Wallet management and transaction signing.
//!
//! # Security
//! - The deployer key comes from config, the environment, or the well-known
//!   development account, in that order
//! - Keys are never logged or serialized

use std::env::VarError;

use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::Signer;

use crate::blockchain::types::{BlockchainError, BlockchainResult};
use crate::keystore::KeyRecord;

/// Environment variable name for the deployer private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "MULTISEND_DEPLOYER_PRIVATE_KEY";

/// First account of the Hardhat/Anvil development mnemonic. Funded on
/// local nodes, worthless anywhere else.
pub const DEV_ACCOUNT_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// A signer bound to a chain.
#[derive(Debug, Clone)]
pub struct Wallet {
    /// The underlying signer (private key), chain id already applied.
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `chain_id` - Chain ID for EIP-155 replay protection
    pub fn from_private_key(private_key_hex: &str, chain_id: u64) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        Ok(Self {
            signer: signer.with_chain_id(Some(chain_id)),
        })
    }

    /// Build a wallet from a provisioned key record.
    pub fn from_record(record: &KeyRecord, chain_id: u64) -> BlockchainResult<Self> {
        Self::from_private_key(record.as_hex(), chain_id)
    }

    /// Resolve the deploying account.
    ///
    /// Order: explicit key, then `MULTISEND_DEPLOYER_PRIVATE_KEY`, then the
    /// development account.
    pub fn deployer(explicit: Option<&str>, chain_id: u64) -> BlockchainResult<Self> {
        Self::resolve_deployer(explicit, std::env::var(PRIVATE_KEY_ENV_VAR), chain_id)
    }

    fn resolve_deployer(
        explicit: Option<&str>,
        from_env: Result<String, VarError>,
        chain_id: u64,
    ) -> BlockchainResult<Self> {
        let wallet = match (explicit, from_env) {
            (Some(key), _) => Self::from_private_key(key, chain_id)?,
            (None, Ok(key)) => Self::from_private_key(&key, chain_id)?,
            (None, Err(VarError::NotUnicode(_))) => {
                return Err(BlockchainError::Wallet(format!(
                    "{} is set but is not valid UTF-8",
                    PRIVATE_KEY_ENV_VAR
                )));
            }
            (None, Err(VarError::NotPresent)) => {
                tracing::debug!("No deployer key configured, using development account");
                Self::from_private_key(DEV_ACCOUNT_PRIVATE_KEY, chain_id)?
            }
        };

        tracing::info!(address = %wallet.address(), chain_id, "Deployer wallet initialized");
        Ok(wallet)
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Get the chain ID this wallet signs for.
    pub fn chain_id(&self) -> Option<u64> {
        self.signer.chain_id()
    }

    /// Underlying signer, for attaching to a provider.
    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

/// Wallets derived from provisioned keys, in key order.
#[derive(Debug, Clone, Default)]
pub struct WalletSet {
    wallets: Vec<Wallet>,
}

impl WalletSet {
    /// Build one wallet per record, all bound to `chain_id`.
    pub fn build(records: &[KeyRecord], chain_id: u64) -> BlockchainResult<Self> {
        let wallets = records
            .iter()
            .map(|record| Wallet::from_record(record, chain_id))
            .collect::<BlockchainResult<Vec<_>>>()?;

        tracing::info!(count = wallets.len(), chain_id, "Wallet set built");
        Ok(Self { wallets })
    }

    /// Addresses in key order.
    pub fn addresses(&self) -> Vec<Address> {
        self.iter().map(Wallet::address).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Wallet> {
        self.wallets.iter()
    }

    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }
}

/// Recipients and amounts for one batch transfer. Always equal length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPlan {
    recipients: Vec<Address>,
    amounts: Vec<U256>,
}

impl TransferPlan {
    /// Send the same `amount` to every wallet in the set.
    pub fn uniform(wallets: &WalletSet, amount: U256) -> Self {
        let recipients = wallets.addresses();
        let amounts = vec![amount; recipients.len()];
        Self { recipients, amounts }
    }

    pub fn recipients(&self) -> &[Address] {
        &self.recipients
    }

    pub fn amounts(&self) -> &[U256] {
        &self.amounts
    }

    pub fn len(&self) -> usize {
        self.recipients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }

    /// Sum of all amounts.
    pub fn total(&self) -> U256 {
        self.amounts.iter().fold(U256::ZERO, |acc, a| acc.saturating_add(*a))
    }
}
