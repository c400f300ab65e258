//! Cryptographic utilities for the panel anchor service
//!
//! Provides:
//! - Canonical JSON hashing (RFC 8785 + Keccak-256) for event digests
//! - The oracle signing key used for anchoring transactions

mod hash;
mod signing;


pub use hash::*;
pub use signing::*;
