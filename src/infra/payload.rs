//! Event payload builder
//!
//! Turns a validated asset record into the `(panelId, eventType, eventHash)`
//! triple the contract stores. Bounds are checked before any ledger call; the
//! anchor timestamp comes from the latest block so it is chain-consistent.

use std::sync::Arc;

use alloy::primitives::Address;
use tracing::debug;

use crate::crypto::compute_event_digest;
use crate::domain::{
    extract_panel_id, inject_provenance, AnchorEvent, AssetId, EventType, ProvenanceMetadata,
};

use super::error::{AnchorError, Result, TransactionStage};
use super::traits::LedgerClient;

/// Builds anchor events from asset records
pub struct EventPayloadBuilder {
    ledger: Arc<dyn LedgerClient>,
    signer_address: Address,
}

impl EventPayloadBuilder {
    pub fn new(ledger: Arc<dyn LedgerClient>, signer_address: Address) -> Self {
        Self {
            ledger,
            signer_address,
        }
    }

    /// Build the anchor event for `record`.
    ///
    /// Injects provenance metadata into `record` in place before hashing:
    /// callers that need the original untouched must pass a copy.
    pub async fn build(
        &self,
        record: &mut serde_json::Value,
        event_type: &str,
    ) -> Result<AnchorEvent> {
        let asset_id = AssetId::parse(extract_panel_id(record)?)?;
        let event_type = EventType::parse(event_type)?;

        let anchored_at = self
            .ledger
            .latest_block_timestamp()
            .await
            .map_err(|e| AnchorError::chain(TransactionStage::Building, e))?;

        let metadata = ProvenanceMetadata {
            oracle_wallet: self.signer_address.to_checksum(None),
            anchored_at,
        };

        seal_event(record, asset_id, event_type, &metadata)
    }
}

/// Inject `metadata` and digest the enriched snapshot.
///
/// Deterministic for fixed inputs; used directly by offline tooling that
/// supplies its own timestamp.
pub fn seal_event(
    record: &mut serde_json::Value,
    asset_id: AssetId,
    event_type: EventType,
    metadata: &ProvenanceMetadata,
) -> Result<AnchorEvent> {
    inject_provenance(record, metadata)?;
    let event_digest = compute_event_digest(asset_id.as_str(), event_type.as_str(), record)?;

    debug!(
        asset_id = %asset_id,
        event_type = %event_type,
        anchored_at = metadata.anchored_at,
        digest = %crate::crypto::to_hex_prefixed(&event_digest),
        "event payload sealed"
    );

    Ok(AnchorEvent {
        asset_id,
        event_type,
        event_digest,
    })
}
