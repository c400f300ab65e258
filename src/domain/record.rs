//! Asset records and provenance metadata
//!
//! An asset record is an arbitrary DPP (digital product passport) document.
//! The only structure the pipeline relies on is the panel id at
//! `["Factory Registration"]["Panel_ID"]` and the metadata section it writes.

use serde::{Deserialize, Serialize};

use crate::infra::{AnchorError, Result};

/// Section holding factory registration data
pub const REGISTRATION_SECTION: &str = "Factory Registration";

/// Field inside [`REGISTRATION_SECTION`] carrying the panel id
pub const PANEL_ID_FIELD: &str = "Panel_ID";

/// Section the pipeline writes provenance metadata into
pub const METADATA_SECTION: &str = "Installation_Metadata";

/// Provenance injected into a record immediately before hashing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceMetadata {
    /// Address of the key that signs the anchoring transaction
    pub oracle_wallet: String,
    /// Timestamp of the latest ledger block at build time (unix seconds)
    pub anchored_at: u64,
}

/// Read the raw panel id from a record.
///
/// Returns [`AnchorError::MalformedRecord`] if the field is absent or not a
/// string. Length bounds are checked separately by [`crate::domain::AssetId`].
pub fn extract_panel_id(record: &serde_json::Value) -> Result<&str> {
    record
        .get(REGISTRATION_SECTION)
        .and_then(|section| section.get(PANEL_ID_FIELD))
        .and_then(|id| id.as_str())
        .ok_or_else(|| {
            AnchorError::MalformedRecord(format!(
                "{PANEL_ID_FIELD} not found at {REGISTRATION_SECTION}.{PANEL_ID_FIELD}"
            ))
        })
}

/// Write `metadata` into the record's metadata section, creating it if needed.
///
/// Existing keys in the section are preserved; `oracle_wallet` and
/// `anchored_at` are overwritten.
pub fn inject_provenance(
    record: &mut serde_json::Value,
    metadata: &ProvenanceMetadata,
) -> Result<()> {
    let root = record
        .as_object_mut()
        .ok_or_else(|| AnchorError::MalformedRecord("record must be a JSON object".into()))?;

    let section = root
        .entry(METADATA_SECTION)
        .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));

    let section = section.as_object_mut().ok_or_else(|| {
        AnchorError::MalformedRecord(format!("{METADATA_SECTION} must be a JSON object"))
    })?;

    section.insert(
        "oracle_wallet".to_string(),
        serde_json::Value::String(metadata.oracle_wallet.clone()),
    );
    section.insert(
        "anchored_at".to_string(),
        serde_json::Value::from(metadata.anchored_at),
    );
    Ok(())
}
