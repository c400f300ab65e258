//! On-chain anchoring module
//!
//! Submits panel event digests to the panel registry contract via
//! `addPanelEvent(panelId, eventType, eventHash)`.
//!
//! Each anchoring call runs the transaction lifecycle
//! `Building -> Signed -> Submitted -> Confirmed` (or `Failed` from any
//! stage). Nonce read, signing and broadcast happen inside one critical
//! section per signing key so concurrent calls never reuse a nonce; the
//! confirmation wait runs outside it.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use alloy::eips::eip2718::Encodable2718;
use alloy::json_abi::JsonAbi;
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, FixedBytes, B256};
use alloy::sol;
use alloy::sol_types::SolCall;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::crypto::OracleSigningKey;
use crate::domain::{AnchorEvent, AnchorReceipt, AnchorTransaction, FeeSettings, GWEI};
use crate::infra::{AnchorError, LedgerClient, Result, TransactionStage};

// Generate contract bindings
sol! {
    interface IPanelRegistry {
        function addPanelEvent(string panelId, string eventType, bytes32 eventHash) external;
    }
}

/// Default time to wait for a receipt after broadcast
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(180);

/// Default interval between receipt polls
pub const DEFAULT_RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Default location of the contract's JSON ABI
pub const DEFAULT_ABI_PATH: &str = "contract_abi.json";

/// How long and how often to wait for a receipt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ConfirmationPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_CONFIRMATION_TIMEOUT,
            poll_interval: DEFAULT_RECEIPT_POLL_INTERVAL,
        }
    }
}

/// Anchor service configuration
#[derive(Debug, Clone)]
pub struct AnchorConfig {
    /// Ledger RPC endpoint
    pub rpc_url: String,
    /// Panel registry contract address
    pub contract_address: Address,
    /// Key used to sign anchoring transactions
    pub signing_key: OracleSigningKey,
    /// Path to the contract's JSON ABI
    pub abi_path: PathBuf,
    /// Fixed fee and gas parameters
    pub fees: FeeSettings,
    /// Receipt wait policy
    pub confirmation: ConfirmationPolicy,
    /// Per-oracle call timeout
    pub oracle_timeout: Duration,
}

impl AnchorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut missing = Vec::new();
        let rpc_url = get("INFURA_URL").or_else(|| get("LEDGER_RPC_URL"));
        if rpc_url.is_none() {
            missing.push("INFURA_URL");
        }
        let contract_address = get("CONTRACT_ADDRESS");
        if contract_address.is_none() {
            missing.push("CONTRACT_ADDRESS");
        }
        let private_key = get("PRIVATE_KEY");
        if private_key.is_none() {
            missing.push("PRIVATE_KEY");
        }

        let (Some(rpc_url), Some(contract_address), Some(private_key)) =
            (rpc_url, contract_address, private_key)
        else {
            return Err(AnchorError::Configuration(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        };

        let contract_address: Address = contract_address.trim().parse().map_err(|e| {
            AnchorError::Configuration(format!("invalid CONTRACT_ADDRESS: {e}"))
        })?;
        let signing_key = OracleSigningKey::from_hex(&private_key)
            .map_err(|e| AnchorError::Configuration(format!("invalid PRIVATE_KEY: {e}")))?;

        let defaults = FeeSettings::default();
        let fees = FeeSettings {
            max_fee_per_gas: gwei_to_wei(
                "MAX_FEE_GWEI",
                parse_or(&get, "MAX_FEE_GWEI", defaults.max_fee_per_gas / GWEI)?,
            )?,
            max_priority_fee_per_gas: gwei_to_wei(
                "MAX_PRIORITY_FEE_GWEI",
                parse_or(
                    &get,
                    "MAX_PRIORITY_FEE_GWEI",
                    defaults.max_priority_fee_per_gas / GWEI,
                )?,
            )?,
            gas_limit: parse_or(&get, "GAS_LIMIT", defaults.gas_limit)?,
        };
        if fees.max_priority_fee_per_gas > fees.max_fee_per_gas {
            return Err(AnchorError::Configuration(
                "MAX_PRIORITY_FEE_GWEI must not exceed MAX_FEE_GWEI".to_string(),
            ));
        }

        let confirmation = ConfirmationPolicy {
            timeout: Duration::from_secs(parse_or(
                &get,
                "CONFIRMATION_TIMEOUT_SECS",
                DEFAULT_CONFIRMATION_TIMEOUT.as_secs(),
            )?),
            poll_interval: Duration::from_millis(parse_or(
                &get,
                "RECEIPT_POLL_INTERVAL_MS",
                DEFAULT_RECEIPT_POLL_INTERVAL.as_millis() as u64,
            )?),
        };

        let oracle_timeout = Duration::from_secs(parse_or(
            &get,
            "ORACLE_TIMEOUT_SECS",
            crate::infra::DEFAULT_ORACLE_TIMEOUT.as_secs(),
        )?);

        Ok(Self {
            rpc_url,
            contract_address,
            signing_key,
            abi_path: PathBuf::from(get("ABI_PATH").unwrap_or_else(|| DEFAULT_ABI_PATH.into())),
            fees,
            confirmation,
            oracle_timeout,
        })
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AnchorError::Configuration(format!("invalid {key}={raw:?}: {e}"))),
        None => Ok(default),
    }
}

fn gwei_to_wei(key: &str, gwei: u128) -> Result<u128> {
    gwei.checked_mul(GWEI)
        .ok_or_else(|| AnchorError::Configuration(format!("{key}={gwei} overflows wei")))
}

/// Outcome of checking the contract ABI file at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiCheck {
    /// File found and declares `addPanelEvent(string,string,bytes32)`
    Verified,
    /// No file at the configured path; the compiled-in binding is used
    NotFound,
}

/// Check that the ABI at `path` declares the anchoring method this service calls.
///
/// Accepts either a bare ABI array or a build artifact with an `abi` field.
pub fn verify_contract_abi(path: &Path) -> Result<AbiCheck> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AbiCheck::NotFound),
        Err(e) => {
            return Err(AnchorError::Configuration(format!(
                "cannot read ABI {}: {e}",
                path.display()
            )))
        }
    };

    let mut value: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
        AnchorError::Configuration(format!("invalid ABI JSON {}: {e}", path.display()))
    })?;
    if let Some(inner) = value.get_mut("abi") {
        value = inner.take();
    }
    let abi: JsonAbi = serde_json::from_value(value).map_err(|e| {
        AnchorError::Configuration(format!("invalid ABI {}: {e}", path.display()))
    })?;

    let declared = abi
        .function("addPanelEvent")
        .map(|overloads| {
            overloads
                .iter()
                .any(|f| f.selector().0 == IPanelRegistry::addPanelEventCall::SELECTOR)
        })
        .unwrap_or(false);

    if declared {
        Ok(AbiCheck::Verified)
    } else {
        Err(AnchorError::Configuration(format!(
            "ABI {} does not declare addPanelEvent(string,string,bytes32)",
            path.display()
        )))
    }
}

/// ABI-encode the `addPanelEvent` call for an event
pub fn encode_anchor_call(event: &AnchorEvent) -> Bytes {
    IPanelRegistry::addPanelEventCall {
        panelId: event.asset_id.as_str().to_string(),
        eventType: event.event_type.as_str().to_string(),
        eventHash: FixedBytes::from(event.event_digest),
    }
    .abi_encode()
    .into()
}

/// Next-nonce bookkeeping for one signing key.
///
/// The ledger's pending count can lag behind a broadcast we just made, so the
/// last nonce we submitted is remembered and the larger of the two is used.
/// A failed broadcast leaves the cursor untouched.
#[derive(Debug, Default)]
struct NonceCursor {
    next: Option<u64>,
    last_tx: Option<B256>,
}

impl NonceCursor {
    fn select(&self, ledger_pending: u64) -> u64 {
        match self.next {
            Some(next) => next.max(ledger_pending),
            None => ledger_pending,
        }
    }

    fn advance_past(&mut self, used: u64, tx_hash: B256) {
        self.next = Some(used + 1);
        self.last_tx = Some(tx_hash);
    }

    /// Forget the remembered nonce if `tx_hash` is still the latest submission.
    ///
    /// Returns whether the cursor was cleared.
    fn release(&mut self, tx_hash: B256) -> bool {
        if self.last_tx != Some(tx_hash) {
            return false;
        }
        self.next = None;
        self.last_tx = None;
        true
    }
}

/// Builds, signs, submits and confirms anchoring transactions for one key
pub struct TransactionLifecycle {
    ledger: Arc<dyn LedgerClient>,
    signing_key: OracleSigningKey,
    contract_address: Address,
    fees: FeeSettings,
    confirmation: ConfirmationPolicy,
    nonce: Mutex<NonceCursor>,
}

impl TransactionLifecycle {
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        signing_key: OracleSigningKey,
        contract_address: Address,
    ) -> Self {
        Self {
            ledger,
            signing_key,
            contract_address,
            fees: FeeSettings::default(),
            confirmation: ConfirmationPolicy::default(),
            nonce: Mutex::new(NonceCursor::default()),
        }
    }

    pub fn with_fees(mut self, fees: FeeSettings) -> Self {
        self.fees = fees;
        self
    }

    pub fn with_confirmation(mut self, confirmation: ConfirmationPolicy) -> Self {
        self.confirmation = confirmation;
        self
    }

    /// Address transactions are sent from
    pub fn signer_address(&self) -> Address {
        self.signing_key.address()
    }

    /// Anchor an event and wait for its receipt.
    ///
    /// On [`AnchorError::ConfirmationTimeout`] the transaction may still be
    /// mined later; callers must treat the outcome as unknown.
    pub async fn anchor(&self, event: &AnchorEvent) -> Result<AnchorReceipt> {
        let tx_hash = self.submit(event).await?;
        self.await_confirmation(tx_hash).await
    }

    /// Build, sign and broadcast the transaction for `event`, returning its hash.
    ///
    /// Holds the per-key nonce lock from nonce read through broadcast.
    pub async fn submit(&self, event: &AnchorEvent) -> Result<B256> {
        let calldata = encode_anchor_call(event);
        let from = self.signing_key.address();

        let mut cursor = self.nonce.lock().await;

        // Building
        let chain_id = self
            .ledger
            .chain_id()
            .await
            .map_err(|e| self.fail(TransactionStage::Building, e))?;
        let pending = self
            .ledger
            .pending_nonce(from)
            .await
            .map_err(|e| self.fail(TransactionStage::Building, e))?;
        let nonce = cursor.select(pending);

        let tx = AnchorTransaction {
            from,
            to: self.contract_address,
            nonce,
            chain_id,
            max_fee_per_gas: self.fees.max_fee_per_gas,
            max_priority_fee_per_gas: self.fees.max_priority_fee_per_gas,
            gas_limit: self.fees.gas_limit,
            calldata,
        };
        debug!(
            asset_id = %event.asset_id,
            nonce,
            chain_id,
            stage = %TransactionStage::Building,
            "anchor transaction built"
        );

        // Signed
        let envelope = tx
            .to_request()
            .build(&self.signing_key.wallet())
            .await
            .map_err(|e| self.fail(TransactionStage::Signed, e))?;
        let raw: Bytes = envelope.encoded_2718().into();
        debug!(nonce, stage = %TransactionStage::Signed, "anchor transaction signed");

        // Submitted
        let tx_hash = self
            .ledger
            .send_raw_transaction(raw)
            .await
            .map_err(|e| self.fail(TransactionStage::Submitted, e))?;
        cursor.advance_past(nonce, tx_hash);
        drop(cursor);

        info!(
            asset_id = %event.asset_id,
            event_type = %event.event_type,
            digest = %event.digest_hex(),
            nonce,
            tx_hash = %tx_hash,
            stage = %TransactionStage::Submitted,
            "anchor transaction sent"
        );
        Ok(tx_hash)
    }

    /// Poll for the receipt of `tx_hash` until it arrives or the timeout elapses.
    ///
    /// Dropping this future abandons the wait; the broadcast transaction is
    /// unaffected.
    pub async fn await_confirmation(&self, tx_hash: B256) -> Result<AnchorReceipt> {
        let poll_interval = self.confirmation.poll_interval;
        let poll = async {
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match self.ledger.transaction_receipt(tx_hash).await {
                    Ok(Some(receipt)) => return receipt,
                    Ok(None) => {}
                    Err(e) => warn!(tx_hash = %tx_hash, error = %e, "receipt poll failed"),
                }
            }
        };

        let receipt = match tokio::time::timeout(self.confirmation.timeout, poll).await {
            Ok(receipt) => receipt,
            Err(_) => {
                // Only the latest submission may hand the nonce back to the ledger count
                if self.nonce.lock().await.release(tx_hash) {
                    debug!(tx_hash = %tx_hash, "nonce cursor released after timeout");
                }
                warn!(
                    tx_hash = %tx_hash,
                    timeout_secs = self.confirmation.timeout.as_secs(),
                    stage = %TransactionStage::Failed,
                    "anchor transaction not confirmed in time"
                );
                return Err(AnchorError::ConfirmationTimeout {
                    tx_hash: tx_hash.to_string(),
                    timeout_secs: self.confirmation.timeout.as_secs(),
                });
            }
        };

        if !receipt.success {
            return Err(self.fail(
                TransactionStage::Confirmed,
                format!(
                    "transaction {} reverted in block {}",
                    tx_hash,
                    receipt.block_number.unwrap_or(0)
                ),
            ));
        }

        info!(
            tx_hash = %tx_hash,
            block = receipt.block_number.unwrap_or(0),
            stage = %TransactionStage::Confirmed,
            "anchor transaction confirmed"
        );
        Ok(receipt)
    }

    fn fail(&self, stage: TransactionStage, err: impl std::fmt::Display) -> AnchorError {
        warn!(
            stage = %stage,
            next = %TransactionStage::Failed,
            error = %err,
            "anchor transaction failed"
        );
        AnchorError::chain(stage, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AssetId, EventType};
    use crate::infra::{LedgerError, MockLedgerClient};
    use alloy::consensus::{Transaction, TxEnvelope};
    use alloy::eips::eip2718::Decodable2718;
    use std::collections::HashMap;

    fn event() -> AnchorEvent {
        AnchorEvent {
            asset_id: AssetId::parse("PNL-001").unwrap(),
            event_type: EventType::default(),
            event_digest: [0x42; 32],
        }
    }

    fn receipt(hash: B256, success: bool) -> AnchorReceipt {
        AnchorReceipt {
            transaction_hash: hash.0,
            block_number: Some(100),
            success,
        }
    }

    fn lifecycle(ledger: MockLedgerClient) -> TransactionLifecycle {
        TransactionLifecycle::new(
            Arc::new(ledger),
            OracleSigningKey::random(),
            Address::repeat_byte(0xcc),
        )
        .with_confirmation(ConfirmationPolicy {
            timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(100),
        })
    }

    #[test]
    fn test_encode_anchor_call_roundtrip() {
        let encoded = encode_anchor_call(&event());
        assert_eq!(&encoded[..4], &IPanelRegistry::addPanelEventCall::SELECTOR);

        let decoded = IPanelRegistry::addPanelEventCall::abi_decode(&encoded, true).unwrap();
        assert_eq!(decoded.panelId, "PNL-001");
        assert_eq!(decoded.eventType, "installation");
        assert_eq!(decoded.eventHash.0, [0x42; 32]);
    }

    #[test]
    fn test_nonce_cursor_prefers_larger() {
        let mut cursor = NonceCursor::default();
        assert_eq!(cursor.select(5), 5);
        cursor.advance_past(5, B256::repeat_byte(1));
        assert_eq!(cursor.select(5), 6);
        assert_eq!(cursor.select(9), 9);
        assert!(cursor.release(B256::repeat_byte(1)));
        assert_eq!(cursor.select(3), 3);
    }

    #[test]
    fn test_nonce_cursor_release_ignores_superseded_tx() {
        let mut cursor = NonceCursor::default();
        cursor.advance_past(7, B256::repeat_byte(1));
        cursor.advance_past(8, B256::repeat_byte(2));

        assert!(!cursor.release(B256::repeat_byte(1)));
        assert_eq!(cursor.select(7), 9);
    }

    #[tokio::test]
    async fn test_submit_signs_expected_transaction() {
        let mut ledger = MockLedgerClient::new();
        ledger.expect_chain_id().returning(|| Ok(1));
        ledger.expect_pending_nonce().returning(|_| Ok(5));
        ledger.expect_send_raw_transaction().returning(|raw| {
            let envelope = TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap();
            assert_eq!(envelope.nonce(), 5);
            assert_eq!(envelope.chain_id(), Some(1));
            assert_eq!(envelope.gas_limit(), 250_000);
            assert_eq!(envelope.max_fee_per_gas(), 30 * GWEI);
            assert_eq!(envelope.max_priority_fee_per_gas(), Some(2 * GWEI));
            assert_eq!(envelope.to(), Some(Address::repeat_byte(0xcc)));
            Ok(*envelope.tx_hash())
        });

        let lifecycle = lifecycle(ledger);
        lifecycle.submit(&event()).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_anchor_polls_until_receipt() {
        let hash = B256::repeat_byte(0xab);
        let mut ledger = MockLedgerClient::new();
        ledger.expect_chain_id().returning(|| Ok(1));
        ledger.expect_pending_nonce().returning(|_| Ok(0));
        ledger
            .expect_send_raw_transaction()
            .returning(move |_| Ok(hash));

        let mut polls = 0;
        ledger
            .expect_transaction_receipt()
            .times(3)
            .returning(move |h| {
                polls += 1;
                if polls < 3 {
                    Ok(None)
                } else {
                    Ok(Some(receipt(h, true)))
                }
            });

        let result = lifecycle(ledger).anchor(&event()).await.unwrap();
        assert_eq!(result.transaction_hash, hash.0);
        assert_eq!(result.block_number, Some(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_anchor_times_out_with_unknown_outcome() {
        let hash = B256::repeat_byte(0x01);
        let mut ledger = MockLedgerClient::new();
        ledger.expect_chain_id().returning(|| Ok(1));
        ledger.expect_pending_nonce().returning(|_| Ok(0));
        ledger
            .expect_send_raw_transaction()
            .returning(move |_| Ok(hash));
        ledger.expect_transaction_receipt().returning(|_| Ok(None));

        let err = lifecycle(ledger).anchor(&event()).await.unwrap_err();
        assert!(matches!(err, AnchorError::ConfirmationTimeout { .. }));
        assert!(err.outcome_unknown());
    }

    #[tokio::test]
    async fn test_build_failure_sends_nothing() {
        let mut ledger = MockLedgerClient::new();
        ledger
            .expect_chain_id()
            .returning(|| Err(LedgerError::new("connection refused")));
        ledger.expect_pending_nonce().times(0);
        ledger.expect_send_raw_transaction().times(0);

        let err = lifecycle(ledger).anchor(&event()).await.unwrap_err();
        assert!(matches!(
            err,
            AnchorError::ChainSubmission {
                stage: TransactionStage::Building,
                ..
            }
        ));
        assert!(!err.outcome_unknown());
    }

    #[tokio::test]
    async fn test_rejected_broadcast_does_not_advance_nonce() {
        let mut ledger = MockLedgerClient::new();
        ledger.expect_chain_id().returning(|| Ok(1));
        ledger.expect_pending_nonce().returning(|_| Ok(7));

        let mut seen: HashMap<u64, usize> = HashMap::new();
        let mut calls = 0;
        ledger.expect_send_raw_transaction().returning(move |raw| {
            calls += 1;
            let envelope = TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap();
            *seen.entry(envelope.nonce()).or_default() += 1;
            // both attempts must reuse nonce 7
            assert_eq!(seen.len(), 1);
            if calls == 1 {
                Err(LedgerError::new("replacement transaction underpriced"))
            } else {
                Ok(*envelope.tx_hash())
            }
        });

        let lifecycle = lifecycle(ledger);
        let err = lifecycle.submit(&event()).await.unwrap_err();
        assert!(err.outcome_unknown());
        lifecycle.submit(&event()).await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_broadcast_keeps_earlier_advance() {
        // Pending count stays at 7 even after the first transaction is accepted
        let mut ledger = MockLedgerClient::new();
        ledger.expect_chain_id().returning(|| Ok(1));
        ledger.expect_pending_nonce().returning(|_| Ok(7));

        let mut calls = 0;
        let mut accepted = Vec::new();
        ledger.expect_send_raw_transaction().returning(move |raw| {
            calls += 1;
            let envelope = TxEnvelope::decode_2718(&mut raw.as_ref()).unwrap();
            if calls == 2 {
                return Err(LedgerError::new("connection reset"));
            }
            accepted.push(envelope.nonce());
            assert_eq!(accepted, (7..7 + accepted.len() as u64).collect::<Vec<_>>());
            Ok(*envelope.tx_hash())
        });

        let lifecycle = lifecycle(ledger);
        lifecycle.submit(&event()).await.unwrap();
        lifecycle.submit(&event()).await.unwrap_err();
        lifecycle.submit(&event()).await.unwrap();
    }

    #[tokio::test]
    async fn test_reverted_receipt_is_failure() {
        let hash = B256::repeat_byte(0x0f);
        let mut ledger = MockLedgerClient::new();
        ledger.expect_chain_id().returning(|| Ok(1));
        ledger.expect_pending_nonce().returning(|_| Ok(0));
        ledger
            .expect_send_raw_transaction()
            .returning(move |_| Ok(hash));
        ledger
            .expect_transaction_receipt()
            .returning(|h| Ok(Some(receipt(h, false))));

        let err = lifecycle(ledger).anchor(&event()).await.unwrap_err();
        assert!(matches!(
            err,
            AnchorError::ChainSubmission {
                stage: TransactionStage::Confirmed,
                ..
            }
        ));
    }

    #[test]
    fn test_config_reports_all_missing_vars() {
        let err = AnchorConfig::from_lookup(|_| None).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("INFURA_URL"));
        assert!(msg.contains("CONTRACT_ADDRESS"));
        assert!(msg.contains("PRIVATE_KEY"));
    }

    #[test]
    fn test_config_defaults() {
        let vars: HashMap<&str, &str> = [
            ("INFURA_URL", "http://localhost:8545"),
            ("CONTRACT_ADDRESS", "0x5FbDB2315678afecb367f032d93F642f64180aa3"),
            (
                "PRIVATE_KEY",
                "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
            ),
        ]
        .into_iter()
        .collect();
        let config = AnchorConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.fees, FeeSettings::default());
        assert_eq!(config.confirmation.timeout, Duration::from_secs(180));
        assert_eq!(config.abi_path, PathBuf::from("contract_abi.json"));
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let base = |extra: (&'static str, &'static str)| {
            let mut vars: HashMap<&str, &str> = [
                ("INFURA_URL", "http://localhost:8545"),
                ("CONTRACT_ADDRESS", "0x5FbDB2315678afecb367f032d93F642f64180aa3"),
                (
                    "PRIVATE_KEY",
                    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
                ),
            ]
            .into_iter()
            .collect();
            vars.insert(extra.0, extra.1);
            AnchorConfig::from_lookup(move |k| vars.get(k).map(|v| v.to_string()))
        };

        assert!(base(("CONTRACT_ADDRESS", "nope")).is_err());
        assert!(base(("PRIVATE_KEY", "0x12")).is_err());
        assert!(base(("GAS_LIMIT", "lots")).is_err());
        assert!(base(("MAX_PRIORITY_FEE_GWEI", "50")).is_err());
        assert!(matches!(
            base(("MAX_FEE_GWEI", "340282366920938463463374607431768211455")),
            Err(AnchorError::Configuration(msg)) if msg.contains("MAX_FEE_GWEI")
        ));
        assert_eq!(
            base(("GAS_LIMIT", "300000")).unwrap().fees.gas_limit,
            300_000
        );
    }

    #[test]
    fn test_verify_abi_variants() {
        let dir = std::env::temp_dir().join(format!("panel-abi-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let good = dir.join("good.json");
        std::fs::write(
            &good,
            r#"[{"type":"function","name":"addPanelEvent","stateMutability":"nonpayable",
                "inputs":[{"name":"panelId","type":"string"},{"name":"eventType","type":"string"},
                          {"name":"eventHash","type":"bytes32"}],"outputs":[]}]"#,
        )
        .unwrap();
        assert_eq!(verify_contract_abi(&good).unwrap(), AbiCheck::Verified);

        let artifact = dir.join("artifact.json");
        std::fs::write(
            &artifact,
            r#"{"contractName":"PanelRegistry","abi":[{"type":"function","name":"addPanelEvent",
                "stateMutability":"nonpayable","inputs":[{"name":"panelId","type":"string"},
                {"name":"eventType","type":"string"},{"name":"eventHash","type":"bytes32"}],
                "outputs":[]}]}"#,
        )
        .unwrap();
        assert_eq!(verify_contract_abi(&artifact).unwrap(), AbiCheck::Verified);

        let wrong = dir.join("wrong.json");
        std::fs::write(
            &wrong,
            r#"[{"type":"function","name":"addPanelEvent","stateMutability":"nonpayable",
                "inputs":[{"name":"panelId","type":"string"}],"outputs":[]}]"#,
        )
        .unwrap();
        assert!(verify_contract_abi(&wrong).is_err());

        assert_eq!(
            verify_contract_abi(&dir.join("absent.json")).unwrap(),
            AbiCheck::NotFound
        );
    }
}
