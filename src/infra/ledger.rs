//! JSON-RPC ledger client backed by an alloy HTTP provider

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, Bytes, B256};
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::types::BlockTransactionsKind;
use alloy::transports::http::{Client, Http};
use async_trait::async_trait;

use crate::domain::AnchorReceipt;

use super::error::{AnchorError, Result};
use super::traits::{LedgerClient, LedgerError};

/// Ledger client over HTTP JSON-RPC.
///
/// Holds no signer: transactions arrive already signed, so the provider never
/// sees key material.
#[derive(Clone)]
pub struct AlloyLedgerClient {
    provider: RootProvider<Http<Client>>,
}

impl AlloyLedgerClient {
    /// Connect to an RPC endpoint
    pub fn new(rpc_url: &str) -> Result<Self> {
        let url = rpc_url
            .parse()
            .map_err(|e| AnchorError::Configuration(format!("Invalid RPC URL: {}", e)))?;
        Ok(Self {
            provider: RootProvider::new_http(url),
        })
    }
}

#[async_trait]
impl LedgerClient for AlloyLedgerClient {
    async fn chain_id(&self) -> std::result::Result<u64, LedgerError> {
        self.provider.get_chain_id().await.map_err(LedgerError::new)
    }

    async fn pending_nonce(&self, address: Address) -> std::result::Result<u64, LedgerError> {
        self.provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(LedgerError::new)
    }

    async fn latest_block_timestamp(&self) -> std::result::Result<u64, LedgerError> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest, BlockTransactionsKind::Hashes)
            .await
            .map_err(LedgerError::new)?
            .ok_or_else(|| LedgerError::new("latest block not available"))?;
        Ok(block.header.timestamp)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> std::result::Result<B256, LedgerError> {
        let pending = self
            .provider
            .send_raw_transaction(&raw)
            .await
            .map_err(LedgerError::new)?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> std::result::Result<Option<AnchorReceipt>, LedgerError> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(LedgerError::new)?;

        Ok(receipt.map(|r| AnchorReceipt {
            transaction_hash: r.transaction_hash.0,
            block_number: r.block_number,
            success: r.status(),
        }))
    }
}
