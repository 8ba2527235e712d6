//! Deployment and upgrade of contracts behind a `TransparentUpgradeableProxy`.
//!
//! A proxy deployment first deploys the implementation contract (or reuses one
//! previously deployed from the same bytecode), then deploys the proxy pointing
//! at it, calling the implementation's initializer through the proxy. The proxy
//! creates its own `ProxyAdmin`, owned by the deployer, through which all
//! upgrades are made.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use alloy::{
    dyn_abi::DynSolValue,
    primitives::{Address, Bytes, B256, U256},
    sol_types::SolCall,
};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::{
    artifacts::{ArtifactResolver, ContractFactory},
    chain::ChainClient,
    constants::{
        IMPLEMENTATION_STORAGE_SLOT, NUM_BYTES_ADDRESS, NUM_BYTES_STORAGE_SLOT,
        PROXY_ADMIN_STORAGE_SLOT, PROXY_CONTRACT,
    },
    deployments::{implementation_key, proxy_admin_key, proxy_key, DeploymentsManifest},
    errors::ScriptError,
    solidity::upgradeAndCallCall,
    types::{DeployedProxy, PendingProxy},
};

/// Deploys contracts behind upgradeable proxies
#[async_trait]
pub trait ProxyDeployer: Send + Sync {
    /// Request the deployment of `factory` behind a proxy, initialized with `args`.
    ///
    /// Returns once the proxy deployment has been sent, before it is confirmed.
    async fn deploy_proxy(
        &self,
        factory: &ContractFactory,
        args: &[DynSolValue],
    ) -> Result<PendingProxy, ScriptError>;

    /// Wait for a pending proxy deployment to be confirmed
    async fn confirm(&self, pending: PendingProxy) -> Result<DeployedProxy, ScriptError>;
}

impl PendingProxy {
    /// Wait for the proxy to be deployed
    pub async fn deployed<D: ProxyDeployer + ?Sized>(
        self,
        deployer: &D,
    ) -> Result<DeployedProxy, ScriptError> {
        deployer.confirm(self).await
    }
}

/// A [`ProxyDeployer`] that deploys and upgrades `TransparentUpgradeableProxy`s
/// through a [`ChainClient`], recording them in the deployments file
pub struct Upgrades<C> {
    /// The client through which transactions are sent
    client: Arc<C>,
    /// The `TransparentUpgradeableProxy` contract
    proxy_factory: ContractFactory,
    /// The path of the deployments file
    deployments_path: PathBuf,
}

impl<C: ChainClient> Upgrades<C> {
    /// Create a deployer sending transactions through `client`
    pub fn new(
        client: Arc<C>,
        proxy_factory: ContractFactory,
        deployments_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            client,
            proxy_factory,
            deployments_path: deployments_path.into(),
        }
    }

    /// Create a deployer sending transactions through `client`, with the
    /// `TransparentUpgradeableProxy` resolved from `artifacts`
    pub fn from_artifacts<R: ArtifactResolver + ?Sized>(
        client: Arc<C>,
        artifacts: &R,
        deployments_path: impl Into<PathBuf>,
    ) -> Result<Self, ScriptError> {
        let proxy_factory = artifacts.resolve(PROXY_CONTRACT)?;
        Ok(Self::new(client, proxy_factory, deployments_path))
    }

    /// The path of the deployments file
    pub fn deployments_path(&self) -> &Path {
        &self.deployments_path
    }

    /// Upgrade the proxy at `proxy` to `factory`, calling the new implementation
    /// with `calldata` if non-empty.
    ///
    /// Returns the address of the new implementation. The proxy is recorded in
    /// the deployments file under `factory`'s name, entries recorded under the
    /// proxy's previous contract name are left as they were.
    pub async fn upgrade_proxy(
        &self,
        proxy: Address,
        factory: &ContractFactory,
        calldata: Bytes,
    ) -> Result<Address, ScriptError> {
        let admin = self
            .read_address_slot(proxy, PROXY_ADMIN_STORAGE_SLOT)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        if admin == Address::ZERO {
            return Err(ScriptError::ContractInteraction(format!(
                "{proxy} has no proxy admin"
            )));
        }

        let implementation = self.deploy_implementation(factory).await?;

        let call = upgradeAndCallCall {
            proxy,
            implementation,
            data: calldata,
        };
        let tx_hash = self
            .client
            .send_transaction(Some(admin), call.abi_encode().into())
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        info!("Upgrading {proxy} to {implementation} through admin {admin}, tx {tx_hash}");

        let receipt = self
            .client
            .wait_for_receipt(tx_hash)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        if !receipt.success {
            return Err(ScriptError::ContractInteraction(format!(
                "upgrade transaction {tx_hash} reverted"
            )));
        }

        let current = self
            .read_address_slot(proxy, IMPLEMENTATION_STORAGE_SLOT)
            .await
            .map_err(|e| ScriptError::ContractInteraction(e.to_string()))?;
        if current != implementation {
            return Err(ScriptError::ContractInteraction(format!(
                "{proxy} points to {current} after upgrading to {implementation}"
            )));
        }

        let mut manifest = DeploymentsManifest::load(&self.deployments_path)?;
        manifest.set_address(&proxy_key(factory.name()), proxy);
        manifest.set_address(&proxy_admin_key(factory.name()), admin);
        manifest.set_address(&implementation_key(factory.name()), implementation);
        manifest.save(&self.deployments_path)?;

        Ok(implementation)
    }

    /// Deploy the implementation contract for `factory`, reusing a previous
    /// deployment of the same bytecode if it is still live
    async fn deploy_implementation(
        &self,
        factory: &ContractFactory,
    ) -> Result<Address, ScriptError> {
        let bytecode_hash = factory.bytecode_hash();
        let mut manifest = DeploymentsManifest::load(&self.deployments_path)?;

        if let Some(existing) = manifest.implementation(bytecode_hash)? {
            let code = self
                .client
                .code_at(existing)
                .await
                .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;
            if !code.is_empty() {
                info!("Reusing {} implementation at {existing}", factory.name());
                return Ok(existing);
            }

            warn!(
                "No code at recorded {} implementation {existing}, redeploying",
                factory.name()
            );
        }

        let tx_hash = self
            .client
            .send_transaction(None, factory.deploy_code(&[])?)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;
        info!("Deploying {} implementation, tx {tx_hash}", factory.name());

        let implementation = self
            .client
            .wait_for_receipt(tx_hash)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?
            .created_address()?;
        info!("{} implementation deployed at {implementation}", factory.name());

        manifest.set_implementation(bytecode_hash, implementation);
        manifest.set_address(&implementation_key(factory.name()), implementation);
        manifest.save(&self.deployments_path)?;

        Ok(implementation)
    }

    /// Reads an address stored in the given storage slot of `address`
    async fn read_address_slot(&self, address: Address, slot: B256) -> Result<Address, ScriptError> {
        let word = self
            .client
            .storage_at(address, U256::from_be_bytes(slot.0))
            .await?
            .to_be_bytes::<NUM_BYTES_STORAGE_SLOT>();

        Ok(Address::from_slice(
            &word[NUM_BYTES_STORAGE_SLOT - NUM_BYTES_ADDRESS..],
        ))
    }
}

#[async_trait]
impl<C: ChainClient> ProxyDeployer for Upgrades<C> {
    async fn deploy_proxy(
        &self,
        factory: &ContractFactory,
        args: &[DynSolValue],
    ) -> Result<PendingProxy, ScriptError> {
        // A bad initializer must fail before any transaction is sent
        let init_data = factory.initializer_calldata(args)?;
        let implementation = self.deploy_implementation(factory).await?;

        let owner = self.client.sender();
        let proxy_code = self.proxy_factory.deploy_code(&[
            DynSolValue::Address(implementation),
            DynSolValue::Address(owner),
            DynSolValue::Bytes(init_data.to_vec()),
        ])?;

        let tx_hash = self
            .client
            .send_transaction(None, proxy_code)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;
        info!("Deploying {} proxy, tx {tx_hash}", factory.name());

        Ok(PendingProxy {
            contract: factory.name().to_string(),
            tx_hash,
            implementation,
        })
    }

    async fn confirm(&self, pending: PendingProxy) -> Result<DeployedProxy, ScriptError> {
        let address = self
            .client
            .wait_for_receipt(pending.tx_hash)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?
            .created_address()?;

        // This is the recommended way to get the proxy admin address:
        // https://github.com/OpenZeppelin/openzeppelin-contracts/blob/v5.0.0/contracts/proxy/ERC1967/ERC1967Utils.sol#L104-L106
        let admin = self
            .read_address_slot(address, PROXY_ADMIN_STORAGE_SLOT)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;
        let implementation = self
            .read_address_slot(address, IMPLEMENTATION_STORAGE_SLOT)
            .await
            .map_err(|e| ScriptError::ContractDeployment(e.to_string()))?;
        if implementation != pending.implementation {
            return Err(ScriptError::ContractDeployment(format!(
                "proxy {address} points to {implementation}, expected {}",
                pending.implementation
            )));
        }
        info!("{} proxy deployed at {address}, admin {admin}", pending.contract);

        let mut manifest = DeploymentsManifest::load(&self.deployments_path)?;
        manifest.set_address(&proxy_key(&pending.contract), address);
        manifest.set_address(&proxy_admin_key(&pending.contract), admin);
        manifest.save(&self.deployments_path)?;

        Ok(DeployedProxy {
            address,
            admin,
            implementation,
        })
    }
}
