//! Implementations of the various deploy scripts

use tracing::info;

use crate::{
    artifacts::{ArtifactResolver, HardhatArtifacts},
    chain::ChainClient,
    cli::{DeployProxyArgs, UpgradeArgs},
    errors::ScriptError,
    upgrades::{ProxyDeployer, Upgrades},
    utils::{parse_addr_or_deployment_key, parse_calldata},
};

/// Deploy the given contract behind a proxy, printing the proxy and proxy admin addresses
pub async fn deploy_proxy<C: ChainClient>(
    args: DeployProxyArgs,
    artifacts: &HardhatArtifacts,
    upgrades: &Upgrades<C>,
) -> Result<(), ScriptError> {
    let factory = artifacts.resolve(&args.contract)?;

    let proxy = upgrades
        .deploy_proxy(&factory, &[])
        .await?
        .deployed(upgrades)
        .await?;

    println!("{} proxy deployed at {}", factory.name(), proxy.address);
    println!("Proxy admin contract deployed at {}", proxy.admin);

    Ok(())
}

/// Upgrade a proxy to the given contract
pub async fn upgrade<C: ChainClient>(
    args: UpgradeArgs,
    artifacts: &HardhatArtifacts,
    upgrades: &Upgrades<C>,
) -> Result<(), ScriptError> {
    let proxy = parse_addr_or_deployment_key(&args.proxy, upgrades.deployments_path())?;
    let factory = artifacts.resolve(&args.contract)?;
    let calldata = parse_calldata(args.calldata.as_deref())?;

    info!("Upgrading proxy {proxy} to {}", factory.qualified_name());
    let implementation = upgrades.upgrade_proxy(proxy, &factory, calldata).await?;

    println!("{proxy} upgraded to {} at {implementation}", factory.name());

    Ok(())
}
