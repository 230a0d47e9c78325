//! Foundational types: identifiers, amounts, obligations and the ledger.

pub mod amount;
pub mod ids;
pub mod ledger;
pub mod obligation;
