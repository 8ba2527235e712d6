//! Definitions of Solidity functions called during upgrades

use alloy::sol;

sol! {
    function upgradeAndCall(address proxy, address implementation, bytes memory data) external payable;
}
