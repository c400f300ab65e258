//! Oracle signing key
//!
//! Wraps the secp256k1 key the service signs anchoring transactions with.
//! The key is loaded once at startup and never leaves this type: callers get
//! the signer address and an [`EthereumWallet`] view for transaction signing.

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

/// Error type for signing key operations
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("invalid secret key format: {0}")]
    InvalidSecretKeyFormat(String),
}

/// Process-wide signing key for anchoring transactions
#[derive(Clone)]
pub struct OracleSigningKey {
    signer: PrivateKeySigner,
}

impl OracleSigningKey {
    /// Parse a hex secret key (with or without `0x` prefix)
    pub fn from_hex(secret: &str) -> Result<Self, SigningError> {
        let signer: PrivateKeySigner = secret
            .trim()
            .parse()
            .map_err(|e| SigningError::InvalidSecretKeyFormat(format!("{e}")))?;
        Ok(Self { signer })
    }

    /// Generate a new random key
    pub fn random() -> Self {
        Self {
            signer: PrivateKeySigner::random(),
        }
    }

    /// Address of the key, recorded as `oracle_wallet` in anchored snapshots
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Wallet used to sign transaction requests
    pub fn wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl From<PrivateKeySigner> for OracleSigningKey {
    fn from(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }
}

impl std::fmt::Debug for OracleSigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleSigningKey")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}
