//! Oracle validation outcomes

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Name of the trust-filter oracle
pub const TRUST_FILTER: &str = "trust_filter";

/// Name of the prediction-verifier oracle
pub const PREDICTION_VERIFIER: &str = "prediction_verifier";

/// Status reported by a single oracle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleStatus {
    /// Oracle accepted the record
    Ok,
    /// Oracle rejected the record
    Rejected(String),
    /// Oracle could not be reached or did not answer in time
    Error(String),
}

impl OracleStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, OracleStatus::Ok)
    }

    /// Wire form: `ok`, `rejected: <reason>`, `error: <message>`
    pub fn as_status_string(&self) -> String {
        match self {
            OracleStatus::Ok => "ok".to_string(),
            OracleStatus::Rejected(reason) => format!("rejected: {reason}"),
            OracleStatus::Error(msg) => format!("error: {msg}"),
        }
    }
}

impl Serialize for OracleStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_status_string())
    }
}

/// Reduced outcome of the validation gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub statuses: BTreeMap<String, OracleStatus>,
}

impl ValidationResult {
    /// Passes only if every expected oracle reported and all reported `Ok`.
    pub fn from_statuses(expected: &[&str], statuses: BTreeMap<String, OracleStatus>) -> Self {
        let passed = !expected.is_empty()
            && expected
                .iter()
                .all(|name| statuses.get(*name).map(OracleStatus::is_ok).unwrap_or(false));
        Self { passed, statuses }
    }

    /// Human-readable summary of the failing oracles
    pub fn failure_summary(&self) -> String {
        let failing: Vec<String> = self
            .statuses
            .iter()
            .filter(|(_, status)| !status.is_ok())
            .map(|(name, status)| format!("{name}={}", status.as_status_string()))
            .collect();
        if failing.is_empty() {
            "no oracle reported".to_string()
        } else {
            failing.join(", ")
        }
    }
}
