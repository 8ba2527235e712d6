//! Reading and writing the `deployments.json` file, which records the addresses
//! of deployed proxies and the implementations behind them

use std::{collections::BTreeMap, fs, path::Path, str::FromStr};

use alloy::primitives::{Address, B256};
use serde::{Deserialize, Serialize};

use crate::{
    constants::{IMPLEMENTATION_KEY_SUFFIX, PROXY_ADMIN_KEY_SUFFIX, PROXY_KEY_SUFFIX},
    errors::ScriptError,
};

/// The contents of the deployments file
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentsManifest {
    /// Deployed contract addresses, keyed by contract key
    #[serde(default)]
    deployments: BTreeMap<String, String>,
    /// Implementation contract addresses, keyed by the hash of their creation bytecode
    #[serde(default)]
    implementations: BTreeMap<String, String>,
}

impl DeploymentsManifest {
    /// Read the manifest at `path`, an absent file being an empty manifest
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents =
            fs::read_to_string(path).map_err(|e| ScriptError::ReadDeployments(e.to_string()))?;
        serde_json::from_str(&contents).map_err(|e| ScriptError::ReadDeployments(e.to_string()))
    }

    /// Write the manifest to `path`, creating the file if needed
    pub fn save(&self, path: &Path) -> Result<(), ScriptError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ScriptError::WriteDeployments(e.to_string()))?;
        fs::write(path, contents).map_err(|e| ScriptError::WriteDeployments(e.to_string()))
    }

    /// The address recorded under `key`
    pub fn address(&self, key: &str) -> Result<Option<Address>, ScriptError> {
        self.deployments.get(key).map(|addr| parse_address(addr)).transpose()
    }

    /// Record `address` under `key`, checksummed
    pub fn set_address(&mut self, key: &str, address: Address) {
        self.deployments.insert(key.to_string(), address.to_string());
    }

    /// The implementation deployed from creation bytecode with the given hash
    pub fn implementation(&self, bytecode_hash: B256) -> Result<Option<Address>, ScriptError> {
        self.implementations
            .get(&format!("{bytecode_hash:#x}"))
            .map(|addr| parse_address(addr))
            .transpose()
    }

    /// Record the implementation deployed from creation bytecode with the given hash
    pub fn set_implementation(&mut self, bytecode_hash: B256, address: Address) {
        self.implementations
            .insert(format!("{bytecode_hash:#x}"), address.to_string());
    }
}

/// The deployments key of the proxy in front of `contract`
pub fn proxy_key(contract: &str) -> String {
    format!("{contract}_{PROXY_KEY_SUFFIX}")
}

/// The deployments key of the admin of the proxy in front of `contract`
pub fn proxy_admin_key(contract: &str) -> String {
    format!("{contract}_{PROXY_ADMIN_KEY_SUFFIX}")
}

/// The deployments key of the implementation of `contract`
pub fn implementation_key(contract: &str) -> String {
    format!("{contract}_{IMPLEMENTATION_KEY_SUFFIX}")
}

/// Parses an address recorded in the deployments file
fn parse_address(addr: &str) -> Result<Address, ScriptError> {
    Address::from_str(addr).map_err(|e| ScriptError::ReadDeployments(format!("{addr}: {e}")))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use alloy::primitives::{address, keccak256};

    use super::{proxy_key, DeploymentsManifest};
    use crate::{artifacts::test_helpers::temp_dir, errors::ScriptError};

    #[test]
    fn test_missing_file_is_empty() {
        let path = temp_dir("manifest-missing").join("deployments.json");

        let manifest = DeploymentsManifest::load(&path).unwrap();

        assert_eq!(manifest, DeploymentsManifest::default());
        assert_eq!(manifest.address(&proxy_key("NFTmarketplace")).unwrap(), None);
    }

    #[test]
    fn test_saved_addresses_are_reloaded() {
        let path = temp_dir("manifest-save").join("deployments.json");
        let proxy = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");
        let implementation = address!("0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512");
        let hash = keccak256([0x60, 0x80]);

        let mut manifest = DeploymentsManifest::default();
        manifest.set_address(&proxy_key("NFTmarketplace"), proxy);
        manifest.set_implementation(hash, implementation);
        manifest.save(&path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents
            .contains(r#""NFTmarketplace_proxy": "0x5FbDB2315678afecb367f032d93F642f64180aa3""#));
        assert!(contents.contains(r#""0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512""#));

        let reloaded = DeploymentsManifest::load(&path).unwrap();
        assert_eq!(
            reloaded.address("NFTmarketplace_proxy").unwrap(),
            Some(proxy)
        );
        assert_eq!(reloaded.implementation(hash).unwrap(), Some(implementation));
        assert_eq!(reloaded.implementation(keccak256([0x00])).unwrap(), None);
    }

    #[test]
    fn test_malformed_entries_are_errors() {
        let dir = temp_dir("manifest-malformed");

        let bad_json = dir.join("bad-json.json");
        fs::write(&bad_json, "{ not json").unwrap();
        assert!(matches!(
            DeploymentsManifest::load(&bad_json),
            Err(ScriptError::ReadDeployments(_))
        ));

        let bad_address = dir.join("bad-address.json");
        fs::write(
            &bad_address,
            r#"{ "deployments": { "NFTmarketplace_proxy": "0x1234" } }"#,
        )
        .unwrap();
        let manifest = DeploymentsManifest::load(&bad_address).unwrap();
        assert!(matches!(
            manifest.address("NFTmarketplace_proxy"),
            Err(ScriptError::ReadDeployments(_))
        ));
    }
}
