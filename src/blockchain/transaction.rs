//! Transaction submission and confirmation.
//!
//! # Responsibilities
//! - Sign and broadcast through the client's wallet-enabled provider
//!   (nonce, gas and chain id are filled by the provider)
//! - Wait for the receipt, bounded by the confirmation timeout
//! - Turn a status-0 receipt into [`BlockchainError::Reverted`]
//!
//! Nothing here retries: one failed send aborts the run.

use std::time::Instant;

use alloy::providers::Provider;
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};

use crate::blockchain::client::ChainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// What a transaction is for; used as a log field and metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxKind {
    Deploy,
    Call,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Deploy => "deploy",
            TxKind::Call => "call",
        }
    }
}

/// Broadcast `request` and wait until it is mined.
pub async fn submit(
    client: &ChainClient,
    request: TransactionRequest,
    kind: TxKind,
) -> BlockchainResult<TransactionReceipt> {
    let started = Instant::now();

    let pending = client
        .provider()
        .send_transaction(request)
        .await
        .map_err(|e| BlockchainError::Rpc(format!("send {} transaction: {}", kind.as_str(), e)))?;

    let tx_hash = *pending.tx_hash();
    tracing::debug!(tx_hash = %tx_hash, kind = kind.as_str(), "Transaction broadcast");

    let receipt = pending
        .with_timeout(Some(client.confirmation_timeout()))
        .get_receipt()
        .await
        .map_err(|e| BlockchainError::Rpc(format!("receipt for {}: {}", tx_hash, e)))?;

    metrics::counter!("multisend_transactions_total", "kind" => kind.as_str()).increment(1);
    metrics::histogram!("multisend_transaction_seconds", "kind" => kind.as_str())
        .record(started.elapsed().as_secs_f64());

    if !receipt.status() {
        metrics::counter!("multisend_transactions_reverted_total", "kind" => kind.as_str())
            .increment(1);
        return Err(BlockchainError::Reverted(format!(
            "{} transaction {} reverted in block {}",
            kind.as_str(),
            tx_hash,
            receipt
                .block_number
                .map(|b| b.to_string())
                .unwrap_or_else(|| "?".to_string())
        )));
    }

    tracing::info!(
        tx_hash = %tx_hash,
        kind = kind.as_str(),
        block_number = ?receipt.block_number,
        gas_used = receipt.gas_used,
        "Transaction confirmed"
    );

    Ok(receipt)
}
