//! End-to-end run: keys → wallets → deploy → invoke.

use std::future::Future;

use alloy::dyn_abi::DynSolValue;
use thiserror::Error;

use crate::blockchain::{
    parse_ether_amount, BlockchainError, ChainClient, ContractArtifact, ContractDeployer, TransferPlan, Wallet,
    WalletSet,
};
use crate::config::DeployerConfig;
use crate::error::{AppError, AppResult};
use crate::keystore::KeyStore;
use crate::lifecycle::Shutdown;
use crate::orchestrator::context::{Deployed, Profile, Provisioned, RunReport, Stage, WalletsReady};

/// A run that stopped before `Done`.
#[derive(Debug, Error)]
#[error("run failed after stage '{stage}': {source}")]
pub struct PipelineError {
    /// Last stage reached before the failing step.
    pub stage: Stage,
    #[source]
    pub source: AppError,
}

impl PipelineError {
    fn at(stage: Stage) -> impl FnOnce(AppError) -> Self {
        move |source| {
            tracing::error!(
                stage = %stage,
                next = %Stage::Failed,
                error = %source,
                "Pipeline step failed"
            );
            Self { stage, source }
        }
    }
}

/// Sequences the run. Owns nothing mutable between stages.
pub struct Orchestrator {
    config: DeployerConfig,
    profile: Profile,
    shutdown: Shutdown,
}

impl Orchestrator {
    pub fn new(config: DeployerConfig, profile: Profile, shutdown: Shutdown) -> Self {
        Self {
            config,
            profile,
            shutdown,
        }
    }

    /// Run every stage in order, stopping at the first failure or on shutdown.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        let mut stage = Stage::Idle;
        tracing::info!(profile = ?self.profile, "Starting run");

        let client = self.connect().map_err(PipelineError::at(stage))?;

        self.ensure_running().map_err(PipelineError::at(stage))?;
        let provisioned = self.provision_keys().map_err(PipelineError::at(stage))?;
        stage = self.advance(stage);

        self.ensure_running().map_err(PipelineError::at(stage))?;
        let ready = self
            .build_wallets(provisioned, &client)
            .map_err(PipelineError::at(stage))?;
        stage = self.advance(stage);

        let deployed = self
            .guarded(self.deploy(ready, &client))
            .await
            .map_err(PipelineError::at(stage))?;
        stage = self.advance(stage);

        let report = self
            .guarded(self.invoke(deployed, &client))
            .await
            .map_err(PipelineError::at(stage))?;
        self.advance(stage);

        Ok(report)
    }

    fn ensure_running(&self) -> AppResult<()> {
        if self.shutdown.is_triggered() {
            return Err(BlockchainError::Cancelled.into());
        }
        Ok(())
    }

    /// Drive `step` unless shutdown fires first.
    async fn guarded<T>(&self, step: impl Future<Output = AppResult<T>>) -> AppResult<T> {
        let mut listener = self.shutdown.subscribe();
        tokio::select! {
            biased;
            _ = listener.cancelled() => Err(BlockchainError::Cancelled.into()),
            result = step => result,
        }
    }

    fn advance(&self, stage: Stage) -> Stage {
        let next = stage.next();
        tracing::info!(from = %stage, to = %next, "Stage complete");
        next
    }

    fn connect(&self) -> AppResult<ChainClient> {
        let chain = &self.config.chain;
        let deployer = Wallet::deployer(chain.deployer_private_key.as_deref(), chain.chain_id)?;
        Ok(ChainClient::connect(chain, &deployer)?)
    }

    /// `Idle → KeysReady`.
    fn provision_keys(&self) -> AppResult<Provisioned> {
        if !self.profile.uses_keys() {
            tracing::debug!("Profile does not use key material, skipping key store");
            return Ok(Provisioned { keys: Vec::new() });
        }

        let store = KeyStore::new(&self.config.keys.dir);
        let keys = store.ensure_keys(self.config.keys.count)?;
        Ok(Provisioned { keys })
    }

    /// `KeysReady → WalletsReady`.
    fn build_wallets(&self, provisioned: Provisioned, client: &ChainClient) -> AppResult<WalletsReady> {
        let wallets = WalletSet::build(&provisioned.keys, client.config().chain_id)?;
        Ok(WalletsReady { wallets })
    }

    /// `WalletsReady → Deployed`.
    async fn deploy(&self, ready: WalletsReady, client: &ChainClient) -> AppResult<Deployed> {
        let contract_config = &self.config.contract;
        let artifact = ContractArtifact::find(&contract_config.artifacts_dir, &contract_config.name)?;
        let value = parse_ether_amount(&contract_config.deploy_value)?;

        if let Err(e) = client.verify_chain_id().await {
            tracing::warn!(error = %e, "Chain verification failed, deploying anyway");
        }

        println!("Deploying ...");
        let contract = ContractDeployer::new(client.clone())
            .deploy(&artifact, value)
            .await?;
        println!("{} deployed to {}", contract.name(), contract.address());

        let balance = contract.balance().await?;
        println!("Contract balance: {} wei", balance);

        Ok(Deployed {
            wallets: ready.wallets,
            contract,
            balance,
        })
    }

    /// `Deployed → Done`.
    async fn invoke(&self, deployed: Deployed, client: &ChainClient) -> AppResult<RunReport> {
        let Deployed {
            wallets,
            contract,
            balance,
        } = deployed;
        let mut report = RunReport {
            profile: self.profile,
            contract_address: contract.address(),
            deploy_tx: contract.deploy_tx(),
            wallet_count: wallets.len(),
            contract_balance: balance,
            getter_output: Vec::new(),
            multisend_rounds: 0,
            blocks: Vec::new(),
        };

        match self.profile {
            Profile::Deploy => {
                for line in contract.interface().signatures() {
                    println!("{}", line);
                }

                let getter = &self.config.contract.getter;
                let encoded = contract.encode_call(getter, &[])?;
                println!("Encoded function data: {}", alloy::hex::encode_prefixed(&encoded));

                let values = contract.read(getter, &[]).await?;
                report.getter_output = values.iter().map(render_value).collect();
                println!("{}() -> {}", getter, report.getter_output.join(", "));
            }
            Profile::Multisend => {
                let amount = parse_ether_amount(&self.config.contract.amount_per_wallet)?;
                let plan = TransferPlan::uniform(&wallets, amount);
                let args = multisend_args(&plan);
                let function = &self.config.contract.multisend_function;

                tracing::info!(
                    recipients = plan.len(),
                    total_wei = %plan.total(),
                    rounds = self.config.contract.rounds,
                    "Starting multisend"
                );

                let mut shutdown = self.shutdown.subscribe();
                for round in 1..=self.config.contract.rounds {
                    contract.call(function, &args).await?;
                    let block = client
                        .wait_for_next_block(&self.config.block_poll, &mut shutdown)
                        .await?;
                    println!("Block number: {}", block);
                    println!("Multisend completed: {}", round);

                    report.blocks.push(block);
                    report.multisend_rounds = round;
                }
            }
        }

        Ok(report)
    }
}

/// `(address[], uint256[])` arguments for a batch transfer.
pub fn multisend_args(plan: &TransferPlan) -> [DynSolValue; 2] {
    [
        DynSolValue::Array(plan.recipients().iter().copied().map(DynSolValue::Address).collect()),
        DynSolValue::Array(
            plan.amounts()
                .iter()
                .map(|amount| DynSolValue::Uint(*amount, 256))
                .collect(),
        ),
    ]
}

fn render_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Address(address) => address.to_string(),
        DynSolValue::Uint(v, _) => v.to_string(),
        DynSolValue::Int(v, _) => v.to_string(),
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::String(s) => s.clone(),
        other => format!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keystore::KeyRecord;
    use alloy::primitives::{address, U256};

    #[test]
    fn test_multisend_args_are_parallel() {
        let records = vec![
            KeyRecord::new("0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80"),
            KeyRecord::new("0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"),
        ];
        let wallets = WalletSet::build(&records, 31337).unwrap();
        let plan = TransferPlan::uniform(&wallets, U256::from(3u64));

        let [recipients, amounts] = multisend_args(&plan);
        match (recipients, amounts) {
            (DynSolValue::Array(r), DynSolValue::Array(a)) => {
                assert_eq!(r.len(), 2);
                assert_eq!(a, vec![DynSolValue::Uint(U256::from(3u64), 256); 2]);
                assert_eq!(r[0], DynSolValue::Address(wallets.addresses()[0]));
            }
            _ => panic!("expected arrays"),
        }
    }

    #[test]
    fn test_render_values() {
        let owner = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");
        assert_eq!(
            render_value(&DynSolValue::Address(owner)),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
        );
        assert_eq!(render_value(&DynSolValue::Uint(U256::from(42u64), 256)), "42");
        assert_eq!(render_value(&DynSolValue::Bool(true)), "true");
    }

    #[test]
    fn test_pipeline_error_display() {
        let err = PipelineError {
            stage: Stage::WalletsReady,
            source: AppError::Blockchain(crate::blockchain::BlockchainError::Rpc("down".into())),
        };
        assert_eq!(
            err.to_string(),
            "run failed after stage 'wallets-ready': RPC error: down"
        );
    }
}
