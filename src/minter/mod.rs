//! Hand-off to the token transfer service.
//!
//! The service owns the blockchain SDK and signing keys; this crate only
//! asks it to move a POAP token to a wallet and records the signature.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransferReceipt {
    pub signature: String,
}

#[async_trait]
pub trait TokenMinter: Send + Sync {
    /// Transfers (minting on demand) one token of `mint_address` to `recipient`.
    async fn transfer(&self, mint_address: &str, recipient: &str) -> Result<TransferReceipt>;

    fn timeout(&self) -> Duration;
}

#[derive(Clone)]
pub struct RpcMinter {
    inner: HttpClient,
    timeout: Duration,
}

impl RpcMinter {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        assert!(!endpoint.is_empty(), "Minter endpoint must be provided");
        assert!(
            timeout >= Duration::from_millis(100),
            "Timeout below 100ms is unsafe"
        );

        let client = HttpClientBuilder::default()
            .request_timeout(timeout)
            .build(endpoint)
            .with_context(|| format!("Failed to build minter client for {endpoint}"))?;

        Ok(Self {
            inner: client,
            timeout,
        })
    }
}

#[async_trait]
impl TokenMinter for RpcMinter {
    async fn transfer(&self, mint_address: &str, recipient: &str) -> Result<TransferReceipt> {
        let mut params = ObjectParams::new();
        params
            .insert("mint_address", mint_address)
            .context("Failed to encode mint_address parameter")?;
        params
            .insert("recipient", recipient)
            .context("Failed to encode recipient parameter")?;

        let receipt: TransferReceipt = self
            .inner
            .request("poap_transferToken", params)
            .await
            .context("RPC call poap_transferToken failed")?;

        if receipt.signature.trim().is_empty() {
            return Err(anyhow!("Transfer service returned an empty signature"));
        }
        Ok(receipt)
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}
