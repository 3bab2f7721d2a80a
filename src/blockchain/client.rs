//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to the JSON-RPC endpoint with the deployer's signer attached
//! - Query chain state (block number, chain id, balances)
//! - Wait for the chain to advance, bounded by timeout and cancellation
//! - Handle timeouts and network errors uniformly

use std::future::IntoFuture;
use std::time::{Duration, Instant};

use alloy::network::EthereumWallet;
use alloy::primitives::{Address, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use tokio::time::{sleep, timeout};

use crate::blockchain::types::{
    BlockPollConfig, BlockchainError, BlockchainResult, ChainConfig, ChainId,
};
use crate::blockchain::wallet::Wallet;
use crate::lifecycle::ShutdownListener;
use crate::resilience::Backoff;

/// Thin wrapper over a provider connection to one node.
#[derive(Clone)]
pub struct ChainClient {
    /// Provider with the deployer wallet filler attached.
    provider: DynProvider,
    /// Configuration.
    config: ChainConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl ChainClient {
    /// Create a client for `config.rpc_url` signing with `deployer`.
    ///
    /// No request is made here; an unreachable node surfaces on first use.
    pub fn connect(config: &ChainConfig, deployer: &Wallet) -> BlockchainResult<Self> {
        let url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(deployer.signer().clone()))
            .connect_http(url)
            .erased();

        tracing::debug!(rpc_url = %config.rpc_url, "Chain client created");

        Ok(Self {
            provider,
            config: config.clone(),
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
        })
    }

    async fn request<T, E, F>(&self, method: &'static str, fut: F) -> BlockchainResult<T>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::warn!(method, error = %e, "RPC error");
                Err(BlockchainError::Rpc(format!("{}: {}", method, e)))
            }
            Err(_) => {
                tracing::warn!(method, "RPC timeout");
                Err(BlockchainError::Timeout(self.config.rpc_timeout_secs))
            }
        }
    }

    /// Get the latest block number.
    pub async fn current_block_height(&self) -> BlockchainResult<u64> {
        self.request("eth_blockNumber", self.provider.get_block_number())
            .await
    }

    /// Get the chain ID reported by the node.
    pub async fn chain_id(&self) -> BlockchainResult<ChainId> {
        self.request("eth_chainId", self.provider.get_chain_id())
            .await
            .map(ChainId)
    }

    /// Verify the connected chain ID matches configuration.
    pub async fn verify_chain_id(&self) -> BlockchainResult<()> {
        let chain_id = self.chain_id().await?;
        if chain_id.0 != self.config.chain_id {
            return Err(BlockchainError::ChainMismatch {
                expected: self.config.chain_id,
                actual: chain_id.0,
            });
        }
        Ok(())
    }

    /// Get the balance of an address.
    pub async fn balance(&self, address: Address) -> BlockchainResult<U256> {
        self.request("eth_getBalance", self.provider.get_balance(address))
            .await
    }

    /// Block until the chain height moves past the height sampled on entry.
    ///
    /// Polls with exponential backoff. Returns the pre-wait height. Fails
    /// with [`BlockchainError::BlockWaitTimeout`] after `poll.timeout_secs`
    /// and with [`BlockchainError::Cancelled`] when `shutdown` fires, including
    /// before the call.
    pub async fn wait_for_next_block(
        &self,
        poll: &BlockPollConfig,
        shutdown: &mut ShutdownListener,
    ) -> BlockchainResult<u64> {
        let start_height = self.current_block_height().await?;
        let backoff = Backoff::from(poll);
        let started = Instant::now();

        let wait = self.poll_until_changed(start_height, backoff, shutdown);

        match timeout(Duration::from_secs(poll.timeout_secs), wait).await {
            Ok(Ok(new_height)) => {
                let elapsed = started.elapsed();
                metrics::histogram!("multisend_block_wait_seconds").record(elapsed.as_secs_f64());
                tracing::debug!(
                    from = start_height,
                    to = new_height,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Observed new block"
                );
                Ok(start_height)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(BlockchainError::BlockWaitTimeout(poll.timeout_secs)),
        }
    }

    async fn poll_until_changed(
        &self,
        start_height: u64,
        backoff: Backoff,
        shutdown: &mut ShutdownListener,
    ) -> BlockchainResult<u64> {
        let mut attempt = 0u32;
        loop {
            attempt = attempt.saturating_add(1);
            tokio::select! {
                _ = sleep(backoff.delay(attempt)) => {}
                _ = shutdown.cancelled() => return Err(BlockchainError::Cancelled),
            }

            let height = self.current_block_height().await?;
            if height != start_height {
                return Ok(height);
            }
            tracing::trace!(height, attempt, "Block height unchanged");
        }
    }

    /// Get the underlying provider.
    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }

    /// Get the configuration.
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Maximum time to wait for a receipt.
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.config.confirmation_timeout_secs)
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
