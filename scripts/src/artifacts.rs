//! Resolution of compiled contract artifacts into deployable contract factories

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy::{
    dyn_abi::{DynSolValue, JsonAbiExt},
    json_abi::JsonAbi,
    primitives::{keccak256, Bytes, B256},
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    constants::{ARTIFACT_EXTENSION, BUILD_INFO_DIR, INITIALIZER_FUNCTION},
    errors::ScriptError,
};

/// Resolves a contract name to a factory capable of producing deployment transactions
pub trait ArtifactResolver {
    /// Resolve the named contract.
    ///
    /// The name is either a bare contract name (`NFTmarketplace`) or a fully
    /// qualified one (`contracts/NFTmarketplace.sol:NFTmarketplace`).
    fn resolve(&self, name: &str) -> Result<ContractFactory, ScriptError>;
}

/// A compiled contract, ready to be deployed
#[derive(Clone, Debug)]
pub struct ContractFactory {
    /// The contract name
    name: String,
    /// The source file the contract was compiled from
    source_name: String,
    /// The contract ABI
    abi: JsonAbi,
    /// The contract creation bytecode
    bytecode: Bytes,
}

impl ContractFactory {
    /// Create a factory from its parts
    pub fn new(name: &str, source_name: &str, abi: JsonAbi, bytecode: Bytes) -> Self {
        Self {
            name: name.to_string(),
            source_name: source_name.to_string(),
            abi,
            bytecode,
        }
    }

    /// The contract name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fully qualified contract name, `<source>:<name>`
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.name)
    }

    /// The contract ABI
    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    /// The keccak256 hash of the creation bytecode, identifying an implementation
    pub fn bytecode_hash(&self) -> B256 {
        keccak256(&self.bytecode)
    }

    /// The creation bytecode followed by the ABI-encoded constructor arguments
    pub fn deploy_code(&self, args: &[DynSolValue]) -> Result<Bytes, ScriptError> {
        let encoded_args = match self.abi.constructor() {
            Some(constructor) => constructor
                .abi_encode_input(args)
                .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))?,
            None if args.is_empty() => Vec::new(),
            None => {
                return Err(ScriptError::CalldataConstruction(format!(
                    "{} has no constructor but {} constructor arguments were given",
                    self.name,
                    args.len()
                )))
            }
        };

        Ok([&self.bytecode[..], encoded_args.as_slice()]
            .concat()
            .into())
    }

    /// Calldata for the `initialize` call made through the proxy on deployment.
    ///
    /// A contract without an initializer is deployed uninitialized, as long as no
    /// initializer arguments were given.
    pub fn initializer_calldata(&self, args: &[DynSolValue]) -> Result<Bytes, ScriptError> {
        let Some(overloads) = self.abi.function(INITIALIZER_FUNCTION) else {
            if args.is_empty() {
                return Ok(Bytes::new());
            }

            return Err(ScriptError::CalldataConstruction(format!(
                "{} has no `{INITIALIZER_FUNCTION}` method but {} initializer arguments were given",
                self.name,
                args.len()
            )));
        };

        let initializer = overloads
            .iter()
            .find(|f| f.inputs.len() == args.len())
            .ok_or_else(|| {
                ScriptError::CalldataConstruction(format!(
                    "no `{INITIALIZER_FUNCTION}` method of {} takes {} arguments",
                    self.name,
                    args.len()
                ))
            })?;

        initializer
            .abi_encode_input(args)
            .map(Bytes::from)
            .map_err(|e| ScriptError::CalldataConstruction(e.to_string()))
    }
}

/// The subset of a Hardhat artifact file needed for deployment
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HardhatArtifact {
    /// The contract name
    contract_name: String,
    /// The source file, relative to the project root
    source_name: String,
    /// The contract ABI
    abi: JsonAbi,
    /// The hex creation bytecode, `0x` for abstract contracts and interfaces
    bytecode: String,
    /// Library placeholders left in the bytecode, keyed by library source file
    #[serde(default)]
    link_references: HashMap<String, serde_json::Value>,
}

impl HardhatArtifact {
    /// The fully qualified contract name, `<source>:<name>`
    fn qualified_name(&self) -> String {
        format!("{}:{}", self.source_name, self.contract_name)
    }

    /// Convert the artifact into a factory, rejecting contracts that cannot be
    /// deployed as they are
    fn into_factory(self) -> Result<ContractFactory, ScriptError> {
        if !self.link_references.is_empty() {
            let mut sources: Vec<_> = self.link_references.keys().cloned().collect();
            sources.sort();
            return Err(ScriptError::ArtifactResolution(format!(
                "{} links against undeployed libraries from {}",
                self.qualified_name(),
                sources.join(", ")
            )));
        }

        let bytecode = Bytes::from_str(&self.bytecode)
            .map_err(|e| ScriptError::ArtifactResolution(e.to_string()))?;
        if bytecode.is_empty() {
            return Err(ScriptError::ArtifactResolution(format!(
                "cannot deploy abstract contract {}",
                self.qualified_name()
            )));
        }

        Ok(ContractFactory::new(
            &self.contract_name,
            &self.source_name,
            self.abi,
            bytecode,
        ))
    }
}

/// Artifacts laid out the way Hardhat writes them:
/// `<root>/<source path>/<Contract>.json`
#[derive(Clone, Debug)]
pub struct HardhatArtifacts {
    /// The artifacts directory
    root: PathBuf,
}

impl HardhatArtifacts {
    /// Resolve artifacts from the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Parses the artifact at `path`
    fn read_artifact(path: &Path) -> Result<HardhatArtifact, ScriptError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ScriptError::ArtifactResolution(format!("{}: {e}", path.display())))?;

        serde_json::from_str(&contents)
            .map_err(|e| ScriptError::ArtifactResolution(format!("{}: {e}", path.display())))
    }
}

impl ArtifactResolver for HardhatArtifacts {
    fn resolve(&self, name: &str) -> Result<ContractFactory, ScriptError> {
        let (source_name, contract_name) = match name.rsplit_once(':') {
            Some((source, contract)) => (Some(source), contract),
            None => (None, name),
        };

        let file_name = format!("{contract_name}.{ARTIFACT_EXTENSION}");
        let mut files = Vec::new();
        collect_files(&self.root, &file_name, &mut files)?;

        let mut matches = Vec::new();
        for path in files {
            let artifact = Self::read_artifact(&path)?;
            if artifact.contract_name != contract_name
                || source_name.is_some_and(|source| artifact.source_name != source)
            {
                continue;
            }

            debug!("Found artifact for {name} at {}", path.display());
            matches.push(artifact);
        }

        if matches.len() > 1 {
            let mut candidates: Vec<_> = matches.iter().map(|a| a.qualified_name()).collect();
            candidates.sort();
            return Err(ScriptError::ArtifactResolution(format!(
                "multiple artifacts for contract {name}, use one of: {}",
                candidates.join(", ")
            )));
        }

        matches
            .pop()
            .ok_or_else(|| {
                ScriptError::ArtifactResolution(format!("no artifact found for contract {name}"))
            })?
            .into_factory()
    }
}

/// Recursively collects every file under `dir` named `file_name`
fn collect_files(dir: &Path, file_name: &str, found: &mut Vec<PathBuf>) -> Result<(), ScriptError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| ScriptError::ArtifactResolution(format!("{}: {e}", dir.display())))?;

    for entry in entries {
        let path = entry
            .map_err(|e| ScriptError::ArtifactResolution(e.to_string()))?
            .path();

        if path.is_dir() {
            if path.file_name().is_some_and(|n| n == BUILD_INFO_DIR) {
                continue;
            }
            collect_files(&path, file_name, found)?;
        } else if path.file_name().is_some_and(|n| n == file_name) {
            found.push(path);
        }
    }

    Ok(())
}
