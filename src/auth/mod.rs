//! Bearer-token authentication for the anchoring endpoint
//!
//! A single shared token is configured via `AUTH_TOKEN`. Only its SHA-256
//! hash is kept in memory, and presented tokens are compared hash to hash.
//! When no token is configured every request is let through.

mod middleware;

pub use middleware::*;

use sha2::{Digest, Sha256};

/// Authentication errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("missing authentication")]
    MissingAuth,

    #[error("invalid bearer token")]
    InvalidToken,
}

/// Validates `Authorization: Bearer <token>` headers
#[derive(Clone)]
pub struct BearerAuth {
    token_hash: Option<[u8; 32]>,
}

impl BearerAuth {
    /// Require `token` on every request
    pub fn new(token: &str) -> Self {
        Self {
            token_hash: Some(hash_token(token)),
        }
    }

    /// Accept every request
    pub fn disabled() -> Self {
        Self { token_hash: None }
    }

    /// Build from an optional configured token; blank counts as unset
    pub fn from_token(token: Option<&str>) -> Self {
        match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => Self::new(t),
            None => Self::disabled(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.token_hash.is_some()
    }

    /// Check the raw `Authorization` header value
    pub fn authenticate(&self, auth_header: Option<&str>) -> Result<(), AuthError> {
        let Some(expected) = &self.token_hash else {
            return Ok(());
        };

        let header = auth_header.ok_or(AuthError::MissingAuth)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        if hash_token(token.trim()) == *expected {
            Ok(())
        } else {
            Err(AuthError::InvalidToken)
        }
    }
}

fn hash_token(token: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().into()
}
