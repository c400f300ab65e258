//! Panel Anchor Library
//!
//! Validates panel lifecycle records and anchors a deterministic digest of
//! each event on an EVM panel registry contract.
//!
//! ## Modules
//!
//! - [`domain`] - Core types (identifiers, records, receipts, fee settings)
//! - [`crypto`] - Canonical JSON hashing and the oracle signing key
//! - [`infra`] - Errors, collaborator traits, ledger client, validation gate, payload builder
//! - [`anchor`] - Contract binding, configuration and the transaction lifecycle
//! - [`pipeline`] - The validate → build → anchor orchestrator
//! - [`auth`] - Bearer-token authentication
//! - [`metrics`] - In-process counters and histograms
//! - [`telemetry`] - Log subscriber setup
//! - [`api`] - REST routes

pub mod anchor;
pub mod api;
pub mod auth;
pub mod crypto;
pub mod domain;
pub mod infra;
pub mod metrics;
pub mod pipeline;
pub mod server;
pub mod telemetry;

// Re-export commonly used types
pub use domain::{AnchorEvent, AnchorOutcome, AnchorReceipt, AssetId, EventType, Hash256};

pub use infra::{AnchorError, LedgerClient, Oracle, Result};

pub use pipeline::{AnchorContext, AnchorPipeline};
