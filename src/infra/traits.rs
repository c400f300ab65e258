//! Trait definitions for the external collaborators of the anchoring pipeline

use alloy::primitives::{Address, Bytes, B256};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::domain::{AnchorReceipt, OracleStatus};

/// Transport-level failure talking to the ledger
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct LedgerError(pub String);

impl LedgerError {
    pub fn new(message: impl std::fmt::Display) -> Self {
        Self(message.to_string())
    }
}

/// Failure reaching an oracle
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct OracleError(pub String);

/// Ledger RPC surface used by the pipeline.
///
/// Implementations must be stateless and safe for concurrent use; nonce
/// ordering is enforced by the caller, not the client.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Chain identifier used for replay protection
    async fn chain_id(&self) -> Result<u64, LedgerError>;

    /// Next nonce for `address`, counting transactions still in the mempool
    async fn pending_nonce(&self, address: Address) -> Result<u64, LedgerError>;

    /// Timestamp (unix seconds) of the latest block
    async fn latest_block_timestamp(&self) -> Result<u64, LedgerError>;

    /// Broadcast an EIP-2718 encoded signed transaction, returning its hash
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, LedgerError>;

    /// Receipt for `tx_hash`, or `None` while it is not yet mined
    async fn transaction_receipt(&self, tx_hash: B256)
        -> Result<Option<AnchorReceipt>, LedgerError>;
}

/// External validator consulted before a record may be anchored.
///
/// Implementations report the oracle's verdict; transport failures should be
/// returned as `Err` and are folded into a failed validation by the gate.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Stable name used as the key in validation results
    fn name(&self) -> &str;

    /// Check a record
    async fn check(&self, record: &serde_json::Value) -> Result<OracleStatus, OracleError>;
}
