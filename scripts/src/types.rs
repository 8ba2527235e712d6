//! Type definitions used throughout the scripts

use alloy::primitives::{Address, TxHash};

use crate::errors::ScriptError;

/// The confirmed outcome of a transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    /// The hash of the confirmed transaction
    pub tx_hash: TxHash,
    /// Whether the transaction executed successfully
    pub success: bool,
    /// The address of the contract created by the transaction, if any
    pub contract_address: Option<Address>,
}

impl Receipt {
    /// The address of the contract created by this transaction, erroring if the
    /// transaction reverted or created nothing
    pub fn created_address(&self) -> Result<Address, ScriptError> {
        if !self.success {
            return Err(ScriptError::ContractDeployment(format!(
                "deployment transaction {} reverted",
                self.tx_hash
            )));
        }

        self.contract_address.ok_or_else(|| {
            ScriptError::ContractDeployment(format!(
                "transaction {} did not create a contract",
                self.tx_hash
            ))
        })
    }
}

/// A proxy deployment that has been sent but not yet confirmed.
///
/// The proxy's address is only known once the deployment is confirmed, so it is
/// not exposed here; await [`crate::upgrades::ProxyDeployer::confirm`] to get a
/// [`DeployedProxy`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingProxy {
    /// The name of the contract deployed behind the proxy
    pub contract: String,
    /// The hash of the proxy deployment transaction
    pub tx_hash: TxHash,
    /// The implementation contract the proxy points to
    pub implementation: Address,
}

/// A proxy whose deployment has been confirmed on-chain
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeployedProxy {
    /// The address of the proxy contract
    pub address: Address,
    /// The address of the `ProxyAdmin` contract created by the proxy
    pub admin: Address,
    /// The address of the implementation contract
    pub implementation: Address,
}
