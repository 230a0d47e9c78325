//! # split-ledger
//!
//! Shared expense splitting with a continuously netted debt ledger.
//!
//! Expenses recorded against a group are split into per-participant
//! shares, and every share becomes an obligation towards the payer. The
//! ledger nets each obligation against the opposite direction as it
//! arrives, so for any pair of people it only ever holds what one of them
//! owes the other.
//!
//! ## Architecture
//!
//! - **core** — Identifiers, amounts and tolerance, obligations, the ledger
//! - **split** — Splitting policies and the share calculator
//! - **registry** — In-memory users, groups and expense log
//! - **tracker** — Records expenses and answers balance queries
//! - **request** / **scenario** — Incoming request shapes and batches of them
//! - **simulation** — Random scenarios for stress testing

pub mod config;
pub mod core;
pub mod registry;
pub mod request;
pub mod scenario;
pub mod simulation;
pub mod split;
pub mod tracker;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::config::TrackerConfig;
    pub use crate::core::amount::TOLERANCE;
    pub use crate::core::ids::{ExpenseId, GroupId, ParticipantId};
    pub use crate::core::ledger::{BalanceEntry, Ledger, LedgerError, ObligationOutcome};
    pub use crate::core::obligation::{Obligation, ObligationSet};
    pub use crate::request::{NewExpense, NewGroup, NewUser};
    pub use crate::split::calculator::{ShareMap, SplitCalculator, SplitError};
    pub use crate::split::policy::{SplitKind, SplitPolicy};
    pub use crate::tracker::{BalanceView, ExpenseTracker, TrackerError};
}
