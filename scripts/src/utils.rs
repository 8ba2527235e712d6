//! Utilities for the deploy scripts.

use std::{path::Path, str::FromStr, sync::Arc};

use alloy::primitives::{Address, Bytes};

use crate::{
    chain::RpcClient, cli::DeployConfig, deployments::DeploymentsManifest, errors::ScriptError,
};

/// Sets up the client with which to send transactions, connecting to the
/// configured RPC url with the configured private key
pub async fn setup_client(config: &DeployConfig) -> Result<Arc<RpcClient>, ScriptError> {
    let client =
        RpcClient::connect(&config.priv_key, &config.rpc_url, config.confirmations).await?;
    Ok(Arc::new(client))
}

/// Parses a contract address given either in hex or as a key in the deployments file
pub fn parse_addr_or_deployment_key(
    addr_or_key: &str,
    deployments_path: &Path,
) -> Result<Address, ScriptError> {
    if addr_or_key.starts_with("0x") {
        return Address::from_str(addr_or_key)
            .map_err(|e| ScriptError::CalldataConstruction(e.to_string()));
    }

    DeploymentsManifest::load(deployments_path)?
        .address(addr_or_key)?
        .ok_or_else(|| {
            ScriptError::ReadDeployments(format!("no deployment recorded for {addr_or_key}"))
        })
}

/// Parses optional hex calldata, absent calldata being empty
pub fn parse_calldata(calldata: Option<&str>) -> Result<Bytes, ScriptError> {
    calldata
        .map(Bytes::from_str)
        .transpose()
        .map(Option::unwrap_or_default)
        .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))
}
