//! Infrastructure for the panel anchor service
//!
//! Error types, collaborator traits, the ledger client, the validation gate
//! and the event payload builder.

mod error;
mod ledger;
mod payload;
mod traits;
mod validation;

pub use error::*;
pub use ledger::*;
pub use payload::*;
pub use traits::*;
pub use validation::*;
