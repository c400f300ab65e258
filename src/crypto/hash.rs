//! Deterministic hashing of panel event snapshots
//!
//! The digest anchored on-chain is the unforgeable fingerprint of an event, so
//! it must be a total function of the document's content:
//! - RFC 8785 JSON Canonicalization Scheme (JCS) for the byte encoding
//! - Keccak-256 over the canonical bytes (the contract stores `bytes32`)
//!
//! # RFC 8785 Compliance
//!
//! Canonicalization is delegated to `serde_json_canonicalizer`. Key properties:
//! - Deterministic key ordering (lexicographic) at every nesting level
//! - No insignificant whitespace
//! - ES6-compatible number serialization (handles floats, -0, etc.)
//! - Fixed string escaping

use alloy::primitives::keccak256;

use crate::domain::Hash256;
use crate::infra::{AnchorError, Result};

/// Convert a JSON value to its canonical string representation per RFC 8785.
///
/// Fails with [`AnchorError::Encoding`] if the value holds content JCS cannot
/// represent.
pub fn canonicalize_json(value: &serde_json::Value) -> Result<String> {
    let bytes = canonical_bytes(value)?;
    String::from_utf8(bytes).map_err(|e| AnchorError::Encoding(e.to_string()))
}

fn canonical_bytes(value: &serde_json::Value) -> Result<Vec<u8>> {
    serde_json_canonicalizer::to_vec(value).map_err(|e| AnchorError::Encoding(e.to_string()))
}

/// Keccak-256 of arbitrary bytes
#[inline]
pub fn keccak(data: &[u8]) -> Hash256 {
    keccak256(data).0
}

/// Keccak-256 over the canonical JSON encoding of `value`.
pub fn canonical_json_hash(value: &serde_json::Value) -> Result<Hash256> {
    Ok(keccak(&canonical_bytes(value)?))
}

/// Compute the digest committed on-chain for one panel event.
///
/// ```text
/// event_digest = KECCAK256(JCS({
///     "panel_id":   asset_id,
///     "event_type": event_type,
///     "dpp":        enriched_record
/// }))
/// ```
///
/// `record` must already carry its provenance metadata; anything injected
/// afterwards is not covered by the digest.
pub fn compute_event_digest(
    asset_id: &str,
    event_type: &str,
    record: &serde_json::Value,
) -> Result<Hash256> {
    let snapshot = serde_json::json!({
        "panel_id": asset_id,
        "event_type": event_type,
        "dpp": record,
    });
    canonical_json_hash(&snapshot)
}

/// Render a digest as `0x`-prefixed lowercase hex
pub fn to_hex_prefixed(hash: &Hash256) -> String {
    format!("0x{}", hex::encode(hash))
}
