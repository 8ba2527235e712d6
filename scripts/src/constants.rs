//! Constants used in the deploy scripts

use std::time::Duration;

use alloy::primitives::{b256, B256};

/// The marketplace contract deployed behind the proxy
pub const MARKETPLACE_CONTRACT: &str = "NFTmarketplace";

/// The marketplace contract the proxy is meant to be upgraded to
pub const MARKETPLACE_UPGRADE_CONTRACT: &str = "NFTmarketplaceV2";

/// The name of the proxy contract artifact.
///
/// Compiled from https://github.com/OpenZeppelin/openzeppelin-contracts/blob/v5.0.0/contracts/proxy/transparent/TransparentUpgradeableProxy.sol
pub const PROXY_CONTRACT: &str = "TransparentUpgradeableProxy";

/// The name of the initializer method called through the proxy on deployment
pub const INITIALIZER_FUNCTION: &str = "initialize";

/// The storage slot containing the proxy admin contract address in the upgradeable proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#admin-address
pub const PROXY_ADMIN_STORAGE_SLOT: B256 =
    b256!("0xb53127684a568b3173ae13b9f8a6016e243e63b6e8ee1178d6a717850b5d6103");

/// The storage slot containing the implementation contract address in the upgradeable proxy.
///
/// This is specified in EIP1967: https://eips.ethereum.org/EIPS/eip-1967#logic-contract-address
pub const IMPLEMENTATION_STORAGE_SLOT: B256 =
    b256!("0x360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc");

/// The number of bytes stored in a single storage slot
pub const NUM_BYTES_STORAGE_SLOT: usize = 32;

/// The number of bytes in an Ethereum address
pub const NUM_BYTES_ADDRESS: usize = 20;

/// How long to wait between polls for a transaction receipt
pub const RECEIPT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// The default RPC URL, a local Anvil / Hardhat node
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

/// The default private key, the first default account in an Anvil node
pub const DEFAULT_DEVNET_PKEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// The default directory holding the compiled contract artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// The default path of the deployments file
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

/// The default number of confirmations to wait for on each transaction
pub const DEFAULT_CONFIRMATIONS: u64 = 1;

/// The log filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

/// The extension of an artifact file
pub const ARTIFACT_EXTENSION: &str = "json";

/// The artifacts subdirectory holding full compiler input / output, never a contract
pub const BUILD_INFO_DIR: &str = "build-info";

/// The suffix of a proxy contract key in the deployments file
pub const PROXY_KEY_SUFFIX: &str = "proxy";

/// The suffix of a proxy admin contract key in the deployments file
pub const PROXY_ADMIN_KEY_SUFFIX: &str = "proxy_admin";

/// The suffix of an implementation contract key in the deployments file
pub const IMPLEMENTATION_KEY_SUFFIX: &str = "implementation";
