//! Domain models for the panel anchor service
//!
//! Identifiers, asset records, oracle outcomes and anchoring transactions.

mod record;
mod transaction;
mod types;
mod validation;

pub use record::*;
pub use transaction::*;
pub use types::*;
pub use validation::*;
