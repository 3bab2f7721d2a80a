//! Contract deployment and invocation through a JSON ABI.
//!
//! # Responsibilities
//! - Submit a creation transaction with an attached balance
//! - Hold the deployed address together with its ABI
//! - Encode, send and read named functions with dynamic arguments

use std::time::Instant;

use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::{Function, JsonAbi, Param, StateMutability};
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::Provider;
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};

use crate::blockchain::artifact::ContractArtifact;
use crate::blockchain::client::ChainClient;
use crate::blockchain::transaction::{submit, TxKind};
use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// A contract ABI with name-based call encoding.
#[derive(Debug, Clone)]
pub struct ContractInterface {
    abi: JsonAbi,
}

impl ContractInterface {
    pub fn new(abi: JsonAbi) -> Self {
        Self { abi }
    }

    /// Pick the first overload of `name` that accepts `args` and encode it.
    fn resolve(&self, name: &str, args: &[DynSolValue]) -> BlockchainResult<(&Function, Vec<u8>)> {
        let overloads = self
            .abi
            .function(name)
            .ok_or_else(|| BlockchainError::Abi(format!("no function '{}' in ABI", name)))?;

        let mut last_error = None;
        for function in overloads {
            match function.abi_encode_input(args) {
                Ok(data) => return Ok((function, data)),
                Err(e) => last_error = Some(e),
            }
        }

        Err(BlockchainError::Abi(format!(
            "arguments do not match any overload of '{}': {}",
            name,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    /// Selector followed by the ABI-encoded arguments.
    pub fn encode_call(&self, name: &str, args: &[DynSolValue]) -> BlockchainResult<Bytes> {
        self.resolve(name, args).map(|(_, data)| Bytes::from(data))
    }

    /// Decode return data of `name` called with `args`.
    pub fn decode_output(
        &self,
        name: &str,
        args: &[DynSolValue],
        data: &[u8],
    ) -> BlockchainResult<Vec<DynSolValue>> {
        let (function, _) = self.resolve(name, args)?;
        function
            .abi_decode_output(data)
            .map_err(|e| BlockchainError::Abi(format!("decode output of '{}': {}", name, e)))
    }

    /// Human-readable listing of every ABI item, one per line.
    pub fn signatures(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if let Some(constructor) = &self.abi.constructor {
            lines.push(format!(
                "constructor({}){}",
                format_params(&constructor.inputs),
                mutability_suffix(constructor.state_mutability)
            ));
        }
        lines.extend(self.abi.functions().map(Function::full_signature));
        lines.extend(self.abi.events().map(|e| e.full_signature()));
        lines.extend(
            self.abi
                .errors()
                .map(|e| format!("error {}({})", e.name, format_params(&e.inputs))),
        );
        if let Some(receive) = &self.abi.receive {
            lines.push(format!("receive() external{}", mutability_suffix(receive.state_mutability)));
        }
        if let Some(fallback) = &self.abi.fallback {
            lines.push(format!("fallback() external{}", mutability_suffix(fallback.state_mutability)));
        }
        lines
    }
}

fn format_params(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| {
            if p.name.is_empty() {
                p.selector_type().into_owned()
            } else {
                format!("{} {}", p.selector_type(), p.name)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn mutability_suffix(mutability: StateMutability) -> &'static str {
    match mutability {
        StateMutability::Pure => " pure",
        StateMutability::View => " view",
        StateMutability::NonPayable => "",
        StateMutability::Payable => " payable",
    }
}

/// Deploys artifacts through a chain client.
#[derive(Debug, Clone)]
pub struct ContractDeployer {
    client: ChainClient,
}

impl ContractDeployer {
    pub fn new(client: ChainClient) -> Self {
        Self { client }
    }

    /// Publish `artifact` with `initial_value` wei attached and wait for the receipt.
    pub async fn deploy(
        &self,
        artifact: &ContractArtifact,
        initial_value: U256,
    ) -> BlockchainResult<DeployedContract> {
        if let Some(constructor) = &artifact.abi.constructor {
            if !constructor.inputs.is_empty() {
                return Err(BlockchainError::Deployment(format!(
                    "{} constructor expects {} argument(s), none supported",
                    artifact.contract_name,
                    constructor.inputs.len()
                )));
            }
            if !initial_value.is_zero() && constructor.state_mutability != StateMutability::Payable {
                tracing::warn!(
                    contract = %artifact.contract_name,
                    "Constructor is not payable, attached value will revert"
                );
            }
        }

        tracing::info!(
            contract = %artifact.contract_name,
            value_wei = %initial_value,
            "Deploying contract"
        );
        let started = Instant::now();

        let request = TransactionRequest::default()
            .with_deploy_code(artifact.bytecode.clone())
            .with_value(initial_value);
        let receipt = submit(&self.client, request, TxKind::Deploy).await?;

        let address = receipt.contract_address.ok_or_else(|| {
            BlockchainError::Deployment(format!(
                "receipt {} has no contract address",
                receipt.transaction_hash
            ))
        })?;

        metrics::histogram!("multisend_deploy_seconds").record(started.elapsed().as_secs_f64());
        tracing::info!(contract = %artifact.contract_name, address = %address, "Contract deployed");

        Ok(DeployedContract {
            name: artifact.contract_name.clone(),
            address,
            deploy_tx: receipt.transaction_hash,
            interface: ContractInterface::new(artifact.abi.clone()),
            client: self.client.clone(),
        })
    }
}

/// Handle to a contract instance on chain.
#[derive(Debug, Clone)]
pub struct DeployedContract {
    name: String,
    address: Address,
    deploy_tx: TxHash,
    interface: ContractInterface,
    client: ChainClient,
}

impl DeployedContract {
    /// Attach to an already deployed instance.
    pub fn at(name: &str, address: Address, abi: JsonAbi, client: ChainClient) -> Self {
        Self {
            name: name.to_string(),
            address,
            deploy_tx: TxHash::ZERO,
            interface: ContractInterface::new(abi),
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Hash of the creation transaction; zero when attached with [`DeployedContract::at`].
    pub fn deploy_tx(&self) -> TxHash {
        self.deploy_tx
    }

    pub fn interface(&self) -> &ContractInterface {
        &self.interface
    }

    pub fn encode_call(&self, name: &str, args: &[DynSolValue]) -> BlockchainResult<Bytes> {
        self.interface.encode_call(name, args)
    }

    /// Send a state-changing call and wait for its receipt.
    pub async fn call(&self, name: &str, args: &[DynSolValue]) -> BlockchainResult<TransactionReceipt> {
        let data = self.encode_call(name, args)?;
        tracing::debug!(contract = %self.address, function = name, "Calling contract");

        let request = TransactionRequest::default()
            .with_to(self.address)
            .with_input(data);
        submit(&self.client, request, TxKind::Call).await
    }

    /// `eth_call` a function and decode its outputs.
    pub async fn read(&self, name: &str, args: &[DynSolValue]) -> BlockchainResult<Vec<DynSolValue>> {
        let data = self.encode_call(name, args)?;
        let request = TransactionRequest::default()
            .with_to(self.address)
            .with_input(data);

        let output = tokio::time::timeout(
            std::time::Duration::from_secs(self.client.config().rpc_timeout_secs),
            self.client.provider().call(request),
        )
        .await
        .map_err(|_| BlockchainError::Timeout(self.client.config().rpc_timeout_secs))?
        .map_err(|e| BlockchainError::Rpc(format!("eth_call {}: {}", name, e)))?;

        self.interface.decode_output(name, args, &output)
    }

    /// Balance held by the contract.
    pub async fn balance(&self) -> BlockchainResult<U256> {
        self.client.balance(self.address).await
    }
}
