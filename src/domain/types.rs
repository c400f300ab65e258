//! Core type definitions for panel event anchoring
//!
//! Identifier newtypes enforce the anchoring contract's byte-length bounds at
//! construction, so an out-of-range value never reaches a ledger call.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::infra::{AnchorError, Result};

/// 32-byte digest (Keccak-256)
pub type Hash256 = [u8; 32];

/// Maximum UTF-8 length of a panel id accepted by the contract
pub const MAX_ASSET_ID_BYTES: usize = 64;

/// Maximum UTF-8 length of an event type accepted by the contract
pub const MAX_EVENT_TYPE_BYTES: usize = 32;

/// Event type used when the caller does not name one
pub const DEFAULT_EVENT_TYPE: &str = "installation";

/// Panel identifier (1..=64 UTF-8 bytes)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssetId(String);

impl AssetId {
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        check_len("panelId", &value, MAX_ASSET_ID_BYTES)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AssetId {
    type Error = AnchorError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<AssetId> for String {
    fn from(id: AssetId) -> Self {
        id.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of lifecycle transition, e.g. `installation` (1..=32 UTF-8 bytes)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventType(String);

impl EventType {
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        check_len("eventType", &value, MAX_EVENT_TYPE_BYTES)?;
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventType {
    fn default() -> Self {
        Self(DEFAULT_EVENT_TYPE.to_string())
    }
}

impl TryFrom<String> for EventType {
    type Error = AnchorError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<EventType> for String {
    fn from(t: EventType) -> Self {
        t.0
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    let len = value.len();
    if len == 0 || len > max {
        return Err(AnchorError::InvalidArgument(format!(
            "Invalid {field} length: {len} bytes (expected 1..={max})"
        )));
    }
    Ok(())
}

/// The exact triple written on-chain by `addPanelEvent`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorEvent {
    pub asset_id: AssetId,
    pub event_type: EventType,
    pub event_digest: Hash256,
}

impl AnchorEvent {
    /// `0x`-prefixed hex of the digest, as passed to the contract
    pub fn digest_hex(&self) -> String {
        crate::crypto::to_hex_prefixed(&self.event_digest)
    }
}

/// Terminal artifact of a confirmed anchoring transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnchorReceipt {
    #[serde(serialize_with = "hash256_hex")]
    pub transaction_hash: Hash256,
    pub block_number: Option<u64>,
    /// Execution status; `false` means the contract reverted
    pub success: bool,
}

/// Result of a full validate → build → anchor run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnchorOutcome {
    pub asset_id: AssetId,
    pub event_type: EventType,
    #[serde(serialize_with = "hash256_hex")]
    pub event_digest: Hash256,
    #[serde(serialize_with = "hash256_hex")]
    pub transaction_hash: Hash256,
    pub block_number: Option<u64>,
}

/// Serialize a Hash256 as a `0x`-prefixed hex string
fn hash256_hex<S>(bytes: &Hash256, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&crate::crypto::to_hex_prefixed(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_id_bounds() {
        assert!(AssetId::parse("PNL-001").is_ok());
        assert!(AssetId::parse("x".repeat(64)).is_ok());
        assert!(matches!(
            AssetId::parse(""),
            Err(AnchorError::InvalidArgument(_))
        ));
        assert!(matches!(
            AssetId::parse("x".repeat(65)),
            Err(AnchorError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_bounds_count_utf8_bytes() {
        // 'é' is two bytes: 32 chars = 64 bytes fits, 33 chars does not
        assert!(AssetId::parse("é".repeat(32)).is_ok());
        assert!(AssetId::parse("é".repeat(33)).is_err());
        assert!(EventType::parse("é".repeat(16)).is_ok());
        assert!(EventType::parse("é".repeat(17)).is_err());
    }

    #[test]
    fn test_event_type_bounds() {
        assert!(EventType::parse("installation").is_ok());
        assert!(EventType::parse("e".repeat(32)).is_ok());
        assert!(EventType::parse("e".repeat(33)).is_err());
        assert!(EventType::parse("").is_err());
        assert_eq!(EventType::default().as_str(), "installation");
    }

    #[test]
    fn test_outcome_serializes_hex() {
        let outcome = AnchorOutcome {
            asset_id: AssetId::parse("PNL-001").unwrap(),
            event_type: EventType::default(),
            event_digest: [0x11; 32],
            transaction_hash: [0xab; 32],
            block_number: Some(7),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["asset_id"], "PNL-001");
        assert_eq!(json["event_type"], "installation");
        assert_eq!(json["transaction_hash"], format!("0x{}", "ab".repeat(32)));
        assert_eq!(json["block_number"], 7);
    }

    #[test]
    fn test_event_type_deserialize_rejects_oversize() {
        let err = serde_json::from_str::<EventType>(&format!("\"{}\"", "e".repeat(40)));
        assert!(err.is_err());
    }
}
