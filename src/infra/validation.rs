//! Two-oracle validation gate
//!
//! Both the trust filter and the prediction verifier must answer `ok` for a
//! record to pass. Transport failures and timeouts count as failed
//! validation; they never abort the caller.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::domain::{OracleStatus, ValidationResult, PREDICTION_VERIFIER, TRUST_FILTER};

use super::traits::{Oracle, OracleError};

/// Default per-oracle call timeout
pub const DEFAULT_ORACLE_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the trust filter and prediction verifier and reduces their verdicts
pub struct ValidationGate {
    trust_filter: Arc<dyn Oracle>,
    prediction_verifier: Arc<dyn Oracle>,
    timeout: Duration,
}

impl ValidationGate {
    pub fn new(trust_filter: Arc<dyn Oracle>, prediction_verifier: Arc<dyn Oracle>) -> Self {
        Self {
            trust_filter,
            prediction_verifier,
            timeout: DEFAULT_ORACLE_TIMEOUT,
        }
    }

    /// Gate backed by placeholder oracles that accept every record
    pub fn pass_through() -> Self {
        Self::new(
            Arc::new(PassThroughOracle::new(TRUST_FILTER)),
            Arc::new(PassThroughOracle::new(PREDICTION_VERIFIER)),
        )
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Validate a record. Read-only with respect to `record`.
    pub async fn validate(&self, record: &serde_json::Value) -> ValidationResult {
        let (trust, prediction) = tokio::join!(
            self.run_oracle(self.trust_filter.as_ref(), record),
            self.run_oracle(self.prediction_verifier.as_ref(), record),
        );

        let mut statuses = BTreeMap::new();
        statuses.insert(self.trust_filter.name().to_string(), trust);
        statuses.insert(self.prediction_verifier.name().to_string(), prediction);

        let expected = [self.trust_filter.name(), self.prediction_verifier.name()];
        let result = ValidationResult::from_statuses(&expected, statuses);
        debug!(passed = result.passed, "validation gate evaluated");
        result
    }

    async fn run_oracle(&self, oracle: &dyn Oracle, record: &serde_json::Value) -> OracleStatus {
        match tokio::time::timeout(self.timeout, oracle.check(record)).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => {
                warn!(oracle = oracle.name(), error = %e, "oracle call failed");
                OracleStatus::Error(e.to_string())
            }
            Err(_) => {
                warn!(
                    oracle = oracle.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "oracle call timed out"
                );
                OracleStatus::Error(format!("timed out after {}ms", self.timeout.as_millis()))
            }
        }
    }
}

/// Placeholder oracle that accepts every record.
///
/// Stands in until real trust-filter / prediction-verifier endpoints are
/// wired up.
#[derive(Debug, Clone)]
pub struct PassThroughOracle {
    name: String,
}

impl PassThroughOracle {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Oracle for PassThroughOracle {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self, _record: &serde_json::Value) -> Result<OracleStatus, OracleError> {
        warn!(oracle = %self.name, "pass-through oracle accepted record without checks");
        Ok(OracleStatus::Ok)
    }
}
