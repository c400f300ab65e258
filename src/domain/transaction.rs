//! Anchoring transaction request
//!
//! Built fresh for every anchoring call inside the nonce critical section and
//! never persisted.

use alloy::primitives::{Address, Bytes};
use alloy::rpc::types::TransactionRequest;

use alloy::network::TransactionBuilder;

/// 1 gwei in wei
pub const GWEI: u128 = 1_000_000_000;

/// Fixed fee and gas parameters for anchoring transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSettings {
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
    pub gas_limit: u64,
}

impl Default for FeeSettings {
    fn default() -> Self {
        Self {
            max_fee_per_gas: 30 * GWEI,
            max_priority_fee_per_gas: 2 * GWEI,
            gas_limit: 250_000,
        }
    }
}

/// EIP-1559 transaction invoking `addPanelEvent` on the anchoring contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorTransaction {
    pub from: Address,
    pub to: Address,
    pub nonce: u64,
    pub chain_id: u64,
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
    pub gas_limit: u64,
    pub calldata: Bytes,
}

impl AnchorTransaction {
    /// Convert into an alloy request with every field filled, so signing
    /// needs no further RPC round trips.
    pub fn to_request(&self) -> TransactionRequest {
        TransactionRequest::default()
            .with_from(self.from)
            .with_to(self.to)
            .with_nonce(self.nonce)
            .with_chain_id(self.chain_id)
            .with_gas_limit(self.gas_limit)
            .with_max_fee_per_gas(self.max_fee_per_gas)
            .with_max_priority_fee_per_gas(self.max_priority_fee_per_gas)
            .with_input(self.calldata.clone())
    }
}
