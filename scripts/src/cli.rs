//! Definitions of CLI arguments and commands for deploy scripts

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    artifacts::HardhatArtifacts,
    chain::ChainClient,
    commands::{deploy_proxy, upgrade},
    constants::{
        DEFAULT_ARTIFACTS_DIR, DEFAULT_CONFIRMATIONS, DEFAULT_DEPLOYMENTS_PATH,
        DEFAULT_DEVNET_PKEY, DEFAULT_RPC_URL,
    },
    errors::ScriptError,
    upgrades::Upgrades,
};

/// Deploy the NFT marketplace behind an upgradeable proxy.
///
/// Without a subcommand, deploys `NFTmarketplace` behind a proxy and prints
/// the proxy address.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Network and account configuration
    #[command(flatten)]
    pub config: DeployConfig,

    /// The command to run instead of the marketplace deployment
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// The network, account, and file locations the scripts run against
#[derive(Args, Clone)]
pub struct DeployConfig {
    /// Private key of the deployer
    #[arg(short, long, env = "PKEY", default_value = DEFAULT_DEVNET_PKEY, hide_env_values = true)]
    pub priv_key: String,

    /// Network RPC URL
    #[arg(short, long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Directory containing the compiled contract artifacts
    #[arg(short, long, env = "ARTIFACTS_DIR", default_value = DEFAULT_ARTIFACTS_DIR)]
    pub artifacts: PathBuf,

    /// Path to the file in which deployed addresses are recorded
    #[arg(short, long, env = "DEPLOYMENTS_PATH", default_value = DEFAULT_DEPLOYMENTS_PATH)]
    pub deployments_path: PathBuf,

    /// Number of confirmations to wait for on each transaction
    #[arg(long, env = "CONFIRMATIONS", default_value_t = DEFAULT_CONFIRMATIONS)]
    pub confirmations: u64,
}

/// The deploy script commands
#[derive(Subcommand)]
pub enum Command {
    /// Deploy any contract behind an upgradeable proxy
    DeployProxy(DeployProxyArgs),
    /// Upgrade a proxy to a new implementation
    Upgrade(UpgradeArgs),
}

impl Command {
    /// Run the command
    pub async fn run<C: ChainClient>(
        self,
        artifacts: &HardhatArtifacts,
        upgrades: &Upgrades<C>,
    ) -> Result<(), ScriptError> {
        match self {
            Command::DeployProxy(args) => deploy_proxy(args, artifacts, upgrades).await,
            Command::Upgrade(args) => upgrade(args, artifacts, upgrades).await,
        }
    }
}

/// Deploy a contract behind a [`TransparentUpgradeableProxy`](https://docs.openzeppelin.com/contracts/5.x/api/proxy#transparent_proxy),
/// which itself deploys a `ProxyAdmin` contract owned by the deployer.
///
/// Calls made directly to the proxy are forwarded to the implementation contract.
/// Upgrade calls can only be made through the `ProxyAdmin`.
#[derive(Args)]
pub struct DeployProxyArgs {
    /// Name of the contract to deploy, optionally qualified by its source file
    #[arg(short, long)]
    pub contract: String,
}

/// Upgrade the implementation behind a proxy
#[derive(Args)]
pub struct UpgradeArgs {
    /// Address of the proxy contract, or its key in the deployments file
    #[arg(long)]
    pub proxy: String,

    /// Name of the new implementation contract
    #[arg(short, long)]
    pub contract: String,

    /// Optional calldata, in hex form, with which to
    /// call the implementation contract when upgrading
    #[arg(long)]
    pub calldata: Option<String>,
}
