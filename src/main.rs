//! MultiSend deployer (v1)
//!
//! Deploys the `MultiSend` contract to a local or test node and exercises it.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI + config ──→ Orchestrator
//!                       │
//!      ┌────────────────┼──────────────────────┬────────────────────────┐
//!      ▼                ▼                      ▼                        ▼
//!  ┌─────────┐    ┌────────────┐    ┌────────────────────┐    ┌──────────────────┐
//!  │keystore │───▶│ WalletSet  │───▶│ ContractDeployer   │───▶│ getter/multisend │
//!  │  files  │    │+TransferPlan│   │ artifact + deploy  │    │ + block waits    │
//!  └─────────┘    └────────────┘    └─────────┬──────────┘    └────────┬─────────┘
//!                                             │                        │
//!                                             ▼                        ▼
//!                                      ┌─────────────────────────────────────┐
//!                                      │ ChainClient (alloy, JSON-RPC/HTTP)  │
//!                                      └─────────────────────────────────────┘
//! ```
//!
//! Exit status is 0 on success and 1 on any failure.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use multisend_deployer::config::{self, DeployerConfig};
use multisend_deployer::lifecycle::{spawn_ctrl_c_handler, Shutdown};
use multisend_deployer::observability::{init_logging, init_metrics};
use multisend_deployer::orchestrator::{Orchestrator, Profile};
use multisend_deployer::AppError;

#[derive(Parser)]
#[command(name = "multisend-deployer")]
#[command(about = "Deploy and exercise the MultiSend contract on a local node", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset.
    #[arg(long)]
    log_level: Option<String>,

    /// JSON-RPC endpoint.
    #[arg(long)]
    rpc_url: Option<String>,

    /// Hardhat artifacts directory.
    #[arg(long)]
    artifacts: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy, print the ABI and query the getter
    Deploy {
        /// Balance to attach, in ether
        #[arg(long)]
        value: Option<String>,
    },
    /// Provision keys, deploy, and batch-transfer to every key's address
    Multisend {
        /// Number of keys to provision
        #[arg(long)]
        count: Option<usize>,

        /// Key directory
        #[arg(long)]
        keys_dir: Option<PathBuf>,

        /// Balance to attach on deployment, in ether
        #[arg(long)]
        value: Option<String>,

        /// Amount per recipient, in ether
        #[arg(long)]
        amount: Option<String>,

        /// Number of multisend calls
        #[arg(long)]
        rounds: Option<u32>,
    },
}

impl Cli {
    /// Fold flag overrides into the loaded configuration.
    fn apply(&self, config: &mut DeployerConfig) -> Profile {
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if let Some(url) = &self.rpc_url {
            config.chain.rpc_url = url.clone();
        }
        if let Some(dir) = &self.artifacts {
            config.contract.artifacts_dir = dir.clone();
        }

        match &self.command {
            Commands::Deploy { value } => {
                if let Some(value) = value {
                    config.contract.deploy_value = value.clone();
                }
                Profile::Deploy
            }
            Commands::Multisend {
                count,
                keys_dir,
                value,
                amount,
                rounds,
            } => {
                if let Some(count) = count {
                    config.keys.count = *count;
                }
                if let Some(dir) = keys_dir {
                    config.keys.dir = dir.clone();
                }
                if let Some(value) = value {
                    config.contract.deploy_value = value.clone();
                }
                if let Some(amount) = amount {
                    config.contract.amount_per_wallet = amount.clone();
                }
                if let Some(rounds) = rounds {
                    config.contract.rounds = *rounds;
                }
                Profile::Multisend
            }
        }
    }
}

fn load(cli: &Cli) -> Result<(DeployerConfig, Profile), AppError> {
    let mut config = config::load_or_default(cli.config.as_deref())?;
    let profile = cli.apply(&mut config);
    config::validate_config(&config).map_err(config::ConfigError::Validation)?;
    Ok((config, profile))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config, profile) = match load(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.observability.log_level);
    let metrics = init_metrics(config.observability.metrics_file.as_deref());

    tracing::info!(
        rpc_url = %config.chain.rpc_url,
        chain_id = config.chain.chain_id,
        contract = %config.contract.name,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    spawn_ctrl_c_handler(shutdown.clone());

    let result = Orchestrator::new(config, profile, shutdown).run().await;

    if let Some(metrics) = &metrics {
        if let Err(e) = metrics.write() {
            tracing::warn!(error = %e, "Failed to write metrics snapshot");
        }
    }

    match result {
        Ok(report) => {
            tracing::info!(
                address = %report.contract_address,
                rounds = report.multisend_rounds,
                "Run complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
