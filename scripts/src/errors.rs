//! Definitions of errors that can occur during the execution of the deploy scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

/// Errors that can occur during the execution of the deploy scripts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// A named contract could not be resolved to a deployable artifact
    ArtifactResolution(String),
    /// Error constructing calldata for a contract method or constructor
    CalldataConstruction(String),
    /// Error initializing the RPC client
    ClientInitialization(String),
    /// Error returned by the RPC node
    Rpc(String),
    /// A deployment transaction was rejected, reverted, or never produced a contract
    ContractDeployment(String),
    /// Error calling a contract method
    ContractInteraction(String),
    /// Error reading the deployments file
    ReadDeployments(String),
    /// Error writing the deployments file
    WriteDeployments(String),
    /// Error writing the script's output
    Output(String),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::ArtifactResolution(s) => write!(f, "error resolving artifact: {}", s),
            ScriptError::CalldataConstruction(s) => write!(f, "error constructing calldata: {}", s),
            ScriptError::ClientInitialization(s) => write!(f, "error initializing client: {}", s),
            ScriptError::Rpc(s) => write!(f, "rpc error: {}", s),
            ScriptError::ContractDeployment(s) => write!(f, "error deploying contract: {}", s),
            ScriptError::ContractInteraction(s) => {
                write!(f, "error interacting with contract: {}", s)
            }
            ScriptError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            ScriptError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
            ScriptError::Output(s) => write!(f, "error writing output: {}", s),
        }
    }
}

impl Error for ScriptError {}
