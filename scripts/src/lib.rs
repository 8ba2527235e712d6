//! Scripts for deploying and upgrading the NFT marketplace contracts behind
//! an upgradeable proxy.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod artifacts;
pub mod chain;
pub mod cli;
mod commands;
pub mod constants;
pub mod deployments;
pub mod errors;
pub mod orchestrator;
mod solidity;
pub mod types;
pub mod upgrades;
pub mod utils;
