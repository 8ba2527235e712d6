//! Tests of the marketplace deployment workflow against mock collaborators

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
    time::Duration,
};

use alloy::{
    dyn_abi::DynSolValue,
    json_abi::JsonAbi,
    primitives::{address, Address, Bytes, B256},
};
use async_trait::async_trait;
use scripts::{
    artifacts::{ArtifactResolver, ContractFactory},
    errors::ScriptError,
    orchestrator::deploy_marketplace,
    types::{DeployedProxy, PendingProxy},
    upgrades::ProxyDeployer,
};

/// The address the mock deployer confirms proxies at
const PROXY_ADDRESS: Address = address!("0xABC0000000000000000000000000000000000123");

/// Resolves only the contracts it was given
#[derive(Default)]
struct MockArtifacts {
    factories: HashMap<String, ContractFactory>,
    resolved: Mutex<Vec<String>>,
}

impl MockArtifacts {
    fn with(names: &[&str]) -> Self {
        let factories = names
            .iter()
            .map(|name| {
                let source = format!("contracts/{name}.sol");
                let factory = ContractFactory::new(
                    name,
                    &source,
                    JsonAbi::new(),
                    Bytes::from_static(&[0x60, 0x80]),
                );
                (name.to_string(), factory)
            })
            .collect();

        Self {
            factories,
            ..Default::default()
        }
    }

    fn resolved(&self) -> Vec<String> {
        self.resolved.lock().unwrap().clone()
    }
}

impl ArtifactResolver for MockArtifacts {
    fn resolve(&self, name: &str) -> Result<ContractFactory, ScriptError> {
        self.resolved.lock().unwrap().push(name.to_string());
        self.factories
            .get(name)
            .cloned()
            .ok_or_else(|| ScriptError::ArtifactResolution(format!("unknown contract {name}")))
    }
}

/// How the mock deployer confirms deployments
#[derive(Clone, Copy)]
enum Confirmation {
    /// Confirm at [`PROXY_ADDRESS`]
    Confirms,
    /// Fail the confirmation
    Fails,
    /// Never confirm
    Never,
}

/// Counts deployment requests and confirmation waits
struct MockDeployer {
    confirmation: Confirmation,
    requests: Mutex<Vec<String>>,
    waits: AtomicUsize,
}

impl MockDeployer {
    fn new(confirmation: Confirmation) -> Self {
        Self {
            confirmation,
            requests: Mutex::new(Vec::new()),
            waits: AtomicUsize::new(0),
        }
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn waits(&self) -> usize {
        self.waits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProxyDeployer for MockDeployer {
    async fn deploy_proxy(
        &self,
        factory: &ContractFactory,
        args: &[DynSolValue],
    ) -> Result<PendingProxy, ScriptError> {
        assert!(args.is_empty());
        self.requests
            .lock()
            .unwrap()
            .push(factory.name().to_string());

        Ok(PendingProxy {
            contract: factory.name().to_string(),
            tx_hash: B256::with_last_byte(1),
            implementation: Address::with_last_byte(0x11),
        })
    }

    async fn confirm(&self, pending: PendingProxy) -> Result<DeployedProxy, ScriptError> {
        self.waits.fetch_add(1, Ordering::SeqCst);

        match self.confirmation {
            Confirmation::Confirms => Ok(DeployedProxy {
                address: PROXY_ADDRESS,
                admin: Address::with_last_byte(0xad),
                implementation: pending.implementation,
            }),
            Confirmation::Fails => Err(ScriptError::ContractDeployment(format!(
                "transaction {} rejected",
                pending.tx_hash
            ))),
            Confirmation::Never => std::future::pending().await,
        }
    }
}

#[tokio::test]
async fn test_deploys_and_reports_proxy_address() {
    let artifacts = MockArtifacts::with(&["NFTmarketplace", "NFTmarketplaceV2"]);
    let deployer = MockDeployer::new(Confirmation::Confirms);
    let mut out = Vec::new();

    deploy_marketplace(&artifacts, &deployer, &mut out)
        .await
        .unwrap();

    let out = String::from_utf8(out).unwrap();
    assert_eq!(out, format!("NFTmarketplaceV2 deployed to: {PROXY_ADDRESS}\n"));
    assert!(out
        .to_lowercase()
        .ends_with("0xabc0000000000000000000000000000000000123\n"));

    // Exactly one deployment, of the first contract, and one wait for it
    assert_eq!(deployer.requests(), vec!["NFTmarketplace"]);
    assert_eq!(deployer.waits(), 1);
    assert_eq!(artifacts.resolved(), vec!["NFTmarketplace", "NFTmarketplaceV2"]);
}

#[tokio::test]
async fn test_output_is_deterministic() {
    let mut outputs = Vec::new();
    for _ in 0..2 {
        let artifacts = MockArtifacts::with(&["NFTmarketplace", "NFTmarketplaceV2"]);
        let deployer = MockDeployer::new(Confirmation::Confirms);
        let mut out = Vec::new();
        deploy_marketplace(&artifacts, &deployer, &mut out)
            .await
            .unwrap();
        outputs.push(out);
    }

    assert_eq!(outputs[0], outputs[1]);
}

#[tokio::test]
async fn test_unknown_marketplace_deploys_nothing() {
    let artifacts = MockArtifacts::with(&["NFTmarketplaceV2"]);
    let deployer = MockDeployer::new(Confirmation::Confirms);
    let mut out = Vec::new();

    let err = deploy_marketplace(&artifacts, &deployer, &mut out)
        .await
        .unwrap_err();

    assert!(matches!(err, ScriptError::ArtifactResolution(_)));
    assert!(out.is_empty());
    assert!(deployer.requests().is_empty());
    assert_eq!(deployer.waits(), 0);
}

#[tokio::test]
async fn test_unknown_upgrade_target_reports_nothing() {
    let artifacts = MockArtifacts::with(&["NFTmarketplace"]);
    let deployer = MockDeployer::new(Confirmation::Confirms);
    let mut out = Vec::new();

    let err = deploy_marketplace(&artifacts, &deployer, &mut out)
        .await
        .unwrap_err();

    assert!(matches!(err, ScriptError::ArtifactResolution(_)));
    assert!(out.is_empty());

    // The upgrade target is only resolved once the deployment is confirmed
    assert_eq!(deployer.requests(), vec!["NFTmarketplace"]);
    assert_eq!(deployer.waits(), 1);
}

#[tokio::test]
async fn test_failed_deployment_reports_nothing() {
    let artifacts = MockArtifacts::with(&["NFTmarketplace", "NFTmarketplaceV2"]);
    let deployer = MockDeployer::new(Confirmation::Fails);
    let mut out = Vec::new();

    let err = deploy_marketplace(&artifacts, &deployer, &mut out)
        .await
        .unwrap_err();

    assert!(matches!(err, ScriptError::ContractDeployment(_)));
    assert!(out.is_empty());
    assert_eq!(artifacts.resolved(), vec!["NFTmarketplace"]);
}

#[tokio::test]
async fn test_unconfirmed_deployment_waits_indefinitely() {
    let artifacts = MockArtifacts::with(&["NFTmarketplace", "NFTmarketplaceV2"]);
    let deployer = MockDeployer::new(Confirmation::Never);
    let mut out = Vec::new();

    let res = tokio::time::timeout(
        Duration::from_millis(200),
        deploy_marketplace(&artifacts, &deployer, &mut out),
    )
    .await;

    assert!(res.is_err(), "workflow finished without a confirmation");
    assert!(out.is_empty());
    assert_eq!(deployer.requests(), vec!["NFTmarketplace"]);
    assert_eq!(deployer.waits(), 1);
}
