//! The RPC collaborator through which the scripts send transactions and read chain state

use std::str::FromStr;

use alloy::{
    network::{ReceiptResponse, TransactionBuilder},
    primitives::{Address, Bytes, TxHash, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    transports::http::reqwest::Url,
};
use async_trait::async_trait;
use tracing::debug;

use crate::{constants::RECEIPT_POLL_INTERVAL, errors::ScriptError, types::Receipt};

/// A client able to sign and send transactions and read chain state
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// The address transactions are sent from
    fn sender(&self) -> Address;

    /// Sign and send a transaction, returning its hash once the node accepts it.
    ///
    /// A `None` recipient creates a contract from `input`.
    async fn send_transaction(
        &self,
        to: Option<Address>,
        input: Bytes,
    ) -> Result<TxHash, ScriptError>;

    /// Wait until the transaction is confirmed.
    ///
    /// There is no timeout, this waits for as long as the node takes.
    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<Receipt, ScriptError>;

    /// The deployed code at `address`
    async fn code_at(&self, address: Address) -> Result<Bytes, ScriptError>;

    /// The value of storage `slot` at `address`
    async fn storage_at(&self, address: Address, slot: U256) -> Result<U256, ScriptError>;
}

/// A [`ChainClient`] backed by a JSON-RPC node
#[derive(Clone)]
pub struct RpcClient {
    /// The provider, with a local signer attached
    provider: DynProvider,
    /// The signer's address
    sender: Address,
    /// The number of blocks a transaction must be buried under to count as confirmed
    confirmations: u64,
}

impl RpcClient {
    /// Connect to the node at `rpc_url`, signing with `priv_key`
    pub async fn connect(
        priv_key: &str,
        rpc_url: &str,
        confirmations: u64,
    ) -> Result<Self, ScriptError> {
        let signer = PrivateKeySigner::from_str(priv_key)
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
        let sender = signer.address();

        let url =
            Url::parse(rpc_url).map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
        let provider = ProviderBuilder::new().wallet(signer).connect_http(url);

        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| ScriptError::ClientInitialization(e.to_string()))?;
        debug!("Connected to chain {chain_id} at {rpc_url} as {sender}");

        Ok(Self {
            provider: DynProvider::new(provider),
            sender,
            confirmations,
        })
    }
}

#[async_trait]
impl ChainClient for RpcClient {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn send_transaction(
        &self,
        to: Option<Address>,
        input: Bytes,
    ) -> Result<TxHash, ScriptError> {
        let tx = match to {
            Some(to) => TransactionRequest::default().with_to(to).with_input(input),
            None => TransactionRequest::default().with_deploy_code(input),
        };

        let pending_tx = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| ScriptError::Rpc(e.to_string()))?;

        Ok(*pending_tx.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: TxHash) -> Result<Receipt, ScriptError> {
        // No timeout, poll until the node has a receipt
        let receipt = loop {
            match self
                .provider
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(|e| ScriptError::Rpc(e.to_string()))?
            {
                Some(receipt) => break receipt,
                None => tokio::time::sleep(RECEIPT_POLL_INTERVAL).await,
            }
        };

        if let Some(mined_in) = receipt.block_number() {
            let confirmed_at = mined_in + self.confirmations.saturating_sub(1);
            while self
                .provider
                .get_block_number()
                .await
                .map_err(|e| ScriptError::Rpc(e.to_string()))?
                < confirmed_at
            {
                tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
            }
        }

        Ok(Receipt {
            tx_hash,
            success: receipt.status(),
            contract_address: receipt.contract_address(),
        })
    }

    async fn code_at(&self, address: Address) -> Result<Bytes, ScriptError> {
        self.provider
            .get_code_at(address)
            .await
            .map_err(|e| ScriptError::Rpc(e.to_string()))
    }

    async fn storage_at(&self, address: Address, slot: U256) -> Result<U256, ScriptError> {
        self.provider
            .get_storage_at(address, slot)
            .await
            .map_err(|e| ScriptError::Rpc(e.to_string()))
    }
}
