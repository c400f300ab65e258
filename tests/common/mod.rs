//! Common test utilities and fixtures for integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{keccak256, Address, Bytes, B256};
use async_trait::async_trait;
use serde_json::json;

use panel_anchor::anchor::ConfirmationPolicy;
use panel_anchor::crypto::OracleSigningKey;
use panel_anchor::domain::{AnchorReceipt, OracleStatus};
use panel_anchor::infra::{LedgerError, Oracle, OracleError, ValidationGate};
use panel_anchor::{AnchorContext, AnchorPipeline, LedgerClient};

/// Anvil account #0
pub const TEST_PRIVATE_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub const TEST_BLOCK_TIMESTAMP: u64 = 1_700_000_000;

pub fn test_signing_key() -> OracleSigningKey {
    OracleSigningKey::from_hex(TEST_PRIVATE_KEY).unwrap()
}

pub fn test_contract() -> Address {
    Address::repeat_byte(0x42)
}

/// Minimal record with a panel id
pub fn panel_record(panel_id: &str) -> serde_json::Value {
    json!({
        "Factory Registration": {
            "Panel_ID": panel_id,
            "Manufacturer": "Helios Works",
            "Rated_Power_W": 410
        },
        "Inspection": {
            "Passed": true,
            "Notes": ["no microcracks", "frame ok"]
        }
    })
}

/// Hand-written ledger double that counts calls and keeps every raw transaction
pub struct MockLedger {
    pub chain_id: u64,
    pub pending_nonce: u64,
    pub block_timestamp: u64,
    /// Fixed hash returned for every broadcast; keccak of the raw bytes otherwise
    pub tx_hash: Option<B256>,
    pub receipt_block: u64,
    pub revert: AtomicBool,
    pub withhold_receipt: AtomicBool,
    pub fail_send: AtomicBool,
    pub calls: AtomicUsize,
    pub sent: Mutex<Vec<Bytes>>,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self {
            chain_id: 1,
            pending_nonce: 0,
            block_timestamp: TEST_BLOCK_TIMESTAMP,
            tx_hash: None,
            receipt_block: 100,
            revert: AtomicBool::new(false),
            withhold_receipt: AtomicBool::new(false),
            fail_send: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }
}

impl MockLedger {
    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.pending_nonce = nonce;
        self
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    pub fn with_tx_hash(mut self, hash: B256) -> Self {
        self.tx_hash = Some(hash);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent_transactions(&self) -> Vec<Bytes> {
        self.sent.lock().unwrap().clone()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn chain_id(&self) -> Result<u64, LedgerError> {
        self.record_call();
        Ok(self.chain_id)
    }

    async fn pending_nonce(&self, _address: Address) -> Result<u64, LedgerError> {
        self.record_call();
        // Yield so concurrent submitters get a chance to interleave
        tokio::task::yield_now().await;
        Ok(self.pending_nonce)
    }

    async fn latest_block_timestamp(&self) -> Result<u64, LedgerError> {
        self.record_call();
        Ok(self.block_timestamp)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, LedgerError> {
        self.record_call();
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(LedgerError::new("nonce too low"));
        }
        let hash = self.tx_hash.unwrap_or_else(|| keccak256(&raw));
        self.sent.lock().unwrap().push(raw);
        Ok(hash)
    }

    async fn transaction_receipt(
        &self,
        tx_hash: B256,
    ) -> Result<Option<AnchorReceipt>, LedgerError> {
        self.record_call();
        if self.withhold_receipt.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(Some(AnchorReceipt {
            transaction_hash: tx_hash.0,
            block_number: Some(self.receipt_block),
            success: !self.revert.load(Ordering::SeqCst),
        }))
    }
}

/// Oracle returning a fixed verdict and counting checks
pub struct FixedOracle {
    pub name: &'static str,
    pub status: OracleStatus,
    pub checks: AtomicUsize,
}

impl FixedOracle {
    pub fn new(name: &'static str, status: OracleStatus) -> Self {
        Self {
            name,
            status,
            checks: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Oracle for FixedOracle {
    fn name(&self) -> &str {
        self.name
    }

    async fn check(&self, _record: &serde_json::Value) -> Result<OracleStatus, OracleError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        Ok(self.status.clone())
    }
}

/// Oracle whose transport always fails
pub struct UnreachableOracle(pub &'static str);

#[async_trait]
impl Oracle for UnreachableOracle {
    fn name(&self) -> &str {
        self.0
    }

    async fn check(&self, _record: &serde_json::Value) -> Result<OracleStatus, OracleError> {
        Err(OracleError("connection refused".to_string()))
    }
}

/// Context with fast confirmation polling for tests
pub fn test_context(ledger: Arc<MockLedger>) -> AnchorContext {
    let mut ctx = AnchorContext::new(ledger, test_signing_key(), test_contract());
    ctx.confirmation = ConfirmationPolicy {
        timeout: Duration::from_secs(2),
        poll_interval: Duration::from_millis(10),
    };
    ctx
}

/// Pipeline with pass-through oracles
pub fn test_pipeline(ledger: Arc<MockLedger>) -> AnchorPipeline {
    AnchorPipeline::new(test_context(ledger))
}

/// Pipeline with a custom gate
pub fn gated_pipeline(ledger: Arc<MockLedger>, gate: ValidationGate) -> AnchorPipeline {
    AnchorPipeline::with_gate(test_context(ledger), gate)
}
