//! Error types for the anchoring pipeline

use thiserror::Error;

/// Errors that can occur while validating and anchoring a panel event
#[derive(Error, Debug)]
pub enum AnchorError {
    /// Missing or malformed startup configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Asset id or event type outside the contract's length bounds
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Required field missing from the input record
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// One or both oracle checks rejected the record
    #[error("Oracle validation failed: {0}")]
    ValidationFailed(String),

    /// Record content could not be canonically encoded
    #[error("encoding error: {0}")]
    Encoding(String),

    /// RPC or transport failure while building, signing or submitting
    #[error("chain submission error ({stage}): {message}")]
    ChainSubmission {
        stage: TransactionStage,
        message: String,
    },

    /// Transaction was broadcast but no receipt arrived in time
    #[error("transaction {tx_hash} not confirmed within {timeout_secs}s; outcome unknown")]
    ConfirmationTimeout { tx_hash: String, timeout_secs: u64 },
}

/// Lifecycle stage of an anchoring transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStage {
    Building,
    Signed,
    Submitted,
    Confirmed,
    Failed,
}

impl std::fmt::Display for TransactionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransactionStage::Building => "building",
            TransactionStage::Signed => "signed",
            TransactionStage::Submitted => "submitted",
            TransactionStage::Confirmed => "confirmed",
            TransactionStage::Failed => "failed",
        };
        f.write_str(s)
    }
}

impl AnchorError {
    pub(crate) fn chain(stage: TransactionStage, message: impl std::fmt::Display) -> Self {
        AnchorError::ChainSubmission {
            stage,
            message: message.to_string(),
        }
    }

    /// Errors the caller must fix by changing its input; retrying as-is is pointless.
    pub fn is_caller_correctable(&self) -> bool {
        matches!(
            self,
            AnchorError::InvalidArgument(_)
                | AnchorError::MalformedRecord(_)
                | AnchorError::ValidationFailed(_)
                | AnchorError::Encoding(_)
        )
    }

    /// Errors after which the transaction may still land on-chain.
    ///
    /// A retry must rebuild the transaction with a fresh nonce read rather than
    /// re-broadcast the same signed bytes.
    pub fn outcome_unknown(&self) -> bool {
        match self {
            AnchorError::ConfirmationTimeout { .. } => true,
            AnchorError::ChainSubmission { stage, .. } => *stage == TransactionStage::Submitted,
            _ => false,
        }
    }

    /// Short machine-readable name used in logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            AnchorError::Configuration(_) => "configuration",
            AnchorError::InvalidArgument(_) => "invalid_argument",
            AnchorError::MalformedRecord(_) => "malformed_record",
            AnchorError::ValidationFailed(_) => "validation_failed",
            AnchorError::Encoding(_) => "encoding",
            AnchorError::ChainSubmission { .. } => "chain_submission",
            AnchorError::ConfirmationTimeout { .. } => "confirmation_timeout",
        }
    }
}

/// Result type for anchoring operations
pub type Result<T> = std::result::Result<T, AnchorError>;
