//! The marketplace deployment workflow: deploy `NFTmarketplace` behind a proxy,
//! resolve its `NFTmarketplaceV2` upgrade target, and report the proxy address

use std::io::Write;

use tracing::info;

use crate::{
    artifacts::ArtifactResolver,
    constants::{MARKETPLACE_CONTRACT, MARKETPLACE_UPGRADE_CONTRACT},
    errors::ScriptError,
    upgrades::ProxyDeployer,
};

/// Deploy the marketplace behind an upgradeable proxy and write its address to `out`.
///
/// The upgrade target is resolved but not deployed. The line written to `out`
/// names the upgrade target while giving the address of the deployed proxy,
/// which is the address the upgrade will keep.
pub async fn deploy_marketplace<R, D, W>(
    resolver: &R,
    deployer: &D,
    out: &mut W,
) -> Result<(), ScriptError>
where
    R: ArtifactResolver + ?Sized,
    D: ProxyDeployer + ?Sized,
    W: Write + ?Sized,
{
    let marketplace = resolver.resolve(MARKETPLACE_CONTRACT)?;
    let instance = deployer
        .deploy_proxy(&marketplace, &[])
        .await?
        .deployed(deployer)
        .await?;

    let upgrade_target = resolver.resolve(MARKETPLACE_UPGRADE_CONTRACT)?;
    info!("Resolved upgrade target {}", upgrade_target.qualified_name());

    writeln!(
        out,
        "{MARKETPLACE_UPGRADE_CONTRACT} deployed to: {}",
        instance.address
    )
    .map_err(|e| ScriptError::Output(e.to_string()))
}
