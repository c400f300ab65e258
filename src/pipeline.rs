//! Anchoring orchestrator
//!
//! `AnchorPipeline::process` runs validate → build → anchor for one record.
//! Everything it needs arrives through an [`AnchorContext`], so a test can
//! swap the ledger or signing key without touching the environment.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::Address;
use tracing::{info, instrument, warn};

use crate::anchor::{AnchorConfig, ConfirmationPolicy, TransactionLifecycle};
use crate::crypto::OracleSigningKey;
use crate::domain::{AnchorOutcome, FeeSettings};
use crate::infra::{
    AnchorError, EventPayloadBuilder, LedgerClient, Result, ValidationGate,
    DEFAULT_ORACLE_TIMEOUT,
};
use crate::metrics::{metric_names, MetricsRegistry};

/// Explicit dependencies of the pipeline
#[derive(Clone)]
pub struct AnchorContext {
    pub ledger: Arc<dyn LedgerClient>,
    pub signing_key: OracleSigningKey,
    pub contract_address: Address,
    pub fees: FeeSettings,
    pub confirmation: ConfirmationPolicy,
    pub oracle_timeout: Duration,
}

impl AnchorContext {
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
            oracle_timeout: DEFAULT_ORACLE_TIMEOUT,
        }
    }

    /// Context for a loaded configuration and a connected ledger client
    pub fn from_config(config: &AnchorConfig, ledger: Arc<dyn LedgerClient>) -> Self {
        Self {
            ledger,
            signing_key: config.signing_key.clone(),
            contract_address: config.contract_address,
            fees: config.fees,
            confirmation: config.confirmation,
            oracle_timeout: config.oracle_timeout,
        }
    }
}

/// Validation gate, payload builder and transaction lifecycle wired together
pub struct AnchorPipeline {
    gate: ValidationGate,
    builder: EventPayloadBuilder,
    lifecycle: TransactionLifecycle,
    metrics: Arc<MetricsRegistry>,
}

impl AnchorPipeline {
    /// Pipeline using the pass-through oracles
    pub fn new(ctx: AnchorContext) -> Self {
        let gate = ValidationGate::pass_through().with_timeout(ctx.oracle_timeout);
        Self::with_gate(ctx, gate)
    }

    pub fn with_gate(ctx: AnchorContext, gate: ValidationGate) -> Self {
        let builder = EventPayloadBuilder::new(ctx.ledger.clone(), ctx.signing_key.address());
        let lifecycle =
            TransactionLifecycle::new(ctx.ledger, ctx.signing_key, ctx.contract_address)
                .with_fees(ctx.fees)
                .with_confirmation(ctx.confirmation);
        Self {
            gate,
            builder,
            lifecycle,
            metrics: Arc::new(MetricsRegistry::new()),
        }
    }

    /// Share an existing metrics registry
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> Arc<MetricsRegistry> {
        self.metrics.clone()
    }

    pub fn signer_address(&self) -> Address {
        self.lifecycle.signer_address()
    }

    /// Validate, build and anchor one record.
    ///
    /// `record` is never modified; provenance is injected into a copy. No
    /// ledger call happens unless validation passes.
    #[instrument(skip_all, fields(event_type = %event_type))]
    pub async fn process(
        &self,
        record: &serde_json::Value,
        event_type: &str,
    ) -> Result<AnchorOutcome> {
        self.metrics.inc_counter(metric_names::ANCHOR_REQUESTS).await;
        let in_flight = self.metrics.track_gauge(metric_names::IN_FLIGHT).await;

        let result = crate::metrics::timed(
            &self.metrics,
            metric_names::ANCHOR_LATENCY,
            self.run(record, event_type),
        )
        .await;

        drop(in_flight);
        if let Err(e) = &result {
            self.metrics.inc_counter(failure_metric(e)).await;
            warn!(kind = e.kind(), error = %e, "anchoring failed");
        }
        result
    }

    async fn run(&self, record: &serde_json::Value, event_type: &str) -> Result<AnchorOutcome> {
        let validation = self.gate.validate(record).await;
        if !validation.passed {
            return Err(AnchorError::ValidationFailed(validation.failure_summary()));
        }

        let mut snapshot = record.clone();
        let event = self.builder.build(&mut snapshot, event_type).await?;

        let tx_hash = self.lifecycle.submit(&event).await?;
        self.metrics.inc_counter(metric_names::TX_SUBMITTED).await;

        let receipt = crate::metrics::timed(
            &self.metrics,
            metric_names::CONFIRMATION_LATENCY,
            self.lifecycle.await_confirmation(tx_hash),
        )
        .await?;
        self.metrics.inc_counter(metric_names::TX_CONFIRMED).await;

        info!(
            asset_id = %event.asset_id,
            digest = %event.digest_hex(),
            tx_hash = %tx_hash,
            "event anchored"
        );

        Ok(AnchorOutcome {
            asset_id: event.asset_id,
            event_type: event.event_type,
            event_digest: event.event_digest,
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
        })
    }
}

fn failure_metric(err: &AnchorError) -> &'static str {
    match err {
        AnchorError::ValidationFailed(_) => metric_names::VALIDATION_REJECTED,
        AnchorError::ConfirmationTimeout { .. } => metric_names::TX_TIMEOUT,
        e if e.is_caller_correctable() => metric_names::INPUT_REJECTED,
        _ => metric_names::TX_FAILED,
    }
}
