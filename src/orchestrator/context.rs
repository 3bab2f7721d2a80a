//! Values threaded between pipeline stages.
//!
//! Each stage consumes the previous value and returns the next, so a later
//! stage cannot run without the output of the one before it.

use alloy::primitives::{Address, TxHash, U256};

use crate::blockchain::{DeployedContract, WalletSet};
use crate::keystore::KeyRecord;

/// Pipeline position. Transitions are strictly linear; any failure is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    KeysReady,
    WalletsReady,
    Deployed,
    Done,
    Failed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Idle => "idle",
            Stage::KeysReady => "keys-ready",
            Stage::WalletsReady => "wallets-ready",
            Stage::Deployed => "deployed",
            Stage::Done => "done",
            Stage::Failed => "failed",
        }
    }

    /// The stage that follows a successful step from `self`.
    pub fn next(&self) -> Stage {
        match self {
            Stage::Idle => Stage::KeysReady,
            Stage::KeysReady => Stage::WalletsReady,
            Stage::WalletsReady => Stage::Deployed,
            Stage::Deployed => Stage::Done,
            Stage::Done | Stage::Failed => *self,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which of the two deployment flows to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Deploy, print the ABI and query the getter. No key material.
    Deploy,
    /// Provision keys, deploy, then batch-transfer to every wallet.
    Multisend,
}

impl Profile {
    pub fn uses_keys(&self) -> bool {
        matches!(self, Profile::Multisend)
    }
}

/// Output of `Idle → KeysReady`.
#[derive(Debug)]
pub struct Provisioned {
    pub keys: Vec<KeyRecord>,
}

/// Output of `KeysReady → WalletsReady`.
#[derive(Debug)]
pub struct WalletsReady {
    pub wallets: WalletSet,
}

/// Output of `WalletsReady → Deployed`.
#[derive(Debug)]
pub struct Deployed {
    pub wallets: WalletSet,
    pub contract: DeployedContract,
    /// Contract balance read back after deployment, in wei.
    pub balance: U256,
}

/// Output of `Deployed → Done`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub profile: Profile,
    pub contract_address: Address,
    pub deploy_tx: TxHash,
    pub wallet_count: usize,
    /// Contract balance right after deployment, in wei.
    pub contract_balance: U256,
    /// Rendered getter return values (deploy profile).
    pub getter_output: Vec<String>,
    /// Completed multisend calls (multisend profile).
    pub multisend_rounds: u32,
    /// Block height sampled before each post-multisend wait.
    pub blocks: Vec<u64>,
}
