//! The expense tracker: records expenses into the ledger and answers
//! balance queries.

use crate::config::TrackerConfig;
use crate::core::amount::round_for_display;
use crate::core::ids::{ExpenseId, GroupId, ParticipantId};
use crate::core::ledger::Ledger;
use crate::core::obligation::ObligationSet;
use crate::registry::expenses::{Expense, ExpenseLog};
use crate::registry::groups::{Group, GroupRegistry};
use crate::registry::users::{User, UserRegistry};
use crate::request::{NewExpense, NewGroup, NewUser, ValidExpense};
use crate::split::calculator::{SplitCalculator, SplitError};
use crate::split::policy::SplitPolicy;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use thiserror::Error;

/// Errors reported to callers of the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("missing fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("group {0} not found")]
    GroupNotFound(GroupId),
    #[error(transparent)]
    Split(#[from] SplitError),
    #[error("tracker state is poisoned")]
    Poisoned,
}

/// A balance with both sides resolved to display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceView {
    pub ower: String,
    pub lender: String,
    pub amount: Decimal,
}

/// Outstanding balances of one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupBalances {
    pub group: GroupId,
    pub name: String,
    pub balances: Vec<BalanceView>,
}

/// Owns the registries and the ledger of one expense-sharing system.
///
/// Recording an expense validates it and computes its shares before any
/// lock on the ledger is taken; all of an expense's obligations are then
/// folded under a single write guard, so readers never see a partly
/// applied expense and a rejected expense changes nothing.
///
/// # Examples
///
/// ```
/// use split_ledger::request::{NewExpense, NewGroup, NewUser};
/// use split_ledger::tracker::ExpenseTracker;
/// use rust_decimal_macros::dec;
///
/// let tracker = ExpenseTracker::new();
/// for name in ["Ana", "Ben", "Cy"] {
///     tracker.create_user(NewUser::new(name)).unwrap();
/// }
/// let group = tracker.create_group(NewGroup::new("Trip", [1, 2, 3])).unwrap();
/// tracker
///     .create_expense(NewExpense::new("Fuel", dec!(90), 1, group.id.get(), "EQUAL"))
///     .unwrap();
///
/// let balances = tracker.get_balances(group.id).unwrap();
/// assert_eq!(balances.len(), 2);
/// assert!(balances.iter().all(|b| b.lender == "Ana" && b.amount == dec!(30)));
/// ```
#[derive(Debug, Default)]
pub struct ExpenseTracker {
    config: TrackerConfig,
    users: RwLock<UserRegistry>,
    groups: RwLock<GroupRegistry>,
    expenses: RwLock<ExpenseLog>,
    ledger: RwLock<Ledger>,
}

impl ExpenseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TrackerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn create_user(&self, request: NewUser) -> Result<User, TrackerError> {
        let name = request
            .name
            .filter(|n| !n.is_empty())
            .ok_or(TrackerError::MissingFields(vec!["name"]))?;

        let user = self
            .users
            .write()
            .map_err(|_| TrackerError::Poisoned)?
            .create(name);
        log::info!("created user {} ({})", user.id, user.name);
        Ok(user)
    }

    pub fn create_group(&self, request: NewGroup) -> Result<Group, TrackerError> {
        let mut missing = Vec::new();
        if request.name.as_deref().map_or(true, str::is_empty) {
            missing.push("name");
        }
        if request.user_ids.is_none() {
            missing.push("userIds");
        }
        let (Some(name), Some(user_ids)) = (request.name, request.user_ids) else {
            return Err(TrackerError::MissingFields(missing));
        };
        if !missing.is_empty() {
            return Err(TrackerError::MissingFields(missing));
        }

        let group = self
            .groups
            .write()
            .map_err(|_| TrackerError::Poisoned)?
            .create(name, user_ids);
        log::info!(
            "created group {} ({}) with {} members",
            group.id,
            group.name,
            group.members.len()
        );
        Ok(group)
    }

    /// Record an expense: split it, fold every non-payer share into the
    /// ledger and store it.
    pub fn create_expense(&self, request: NewExpense) -> Result<Expense, TrackerError> {
        let valid = request.validate()?;
        let group = self
            .group(valid.group_id)?
            .ok_or(TrackerError::GroupNotFound(valid.group_id))?;
        let policy = SplitPolicy::from_tag(
            &valid.split_type,
            valid.split_details.amounts.clone(),
            valid.split_details.percentages.clone(),
        )?;

        if self.config.require_group_members {
            Self::check_membership(&group, &valid, &policy)?;
        }

        let participants = valid
            .split_details
            .participants
            .clone()
            .unwrap_or_else(|| group.members.clone());
        let shares = SplitCalculator::compute_shares(valid.amount, &policy, &participants)?;

        let mut expenses = self.expenses.write().map_err(|_| TrackerError::Poisoned)?;
        let mut ledger = self.ledger.write().map_err(|_| TrackerError::Poisoned)?;

        let id = expenses.next_id();
        let obligations = ObligationSet::from_shares(group.id, valid.paid_by, &shares).for_expense(id);
        ledger
            .apply_all(&obligations)
            .map_err(|e| TrackerError::InvalidInput(e.to_string()))?;

        let expense = Expense {
            id,
            description: valid.description,
            amount: valid.amount,
            paid_by: valid.paid_by,
            group_id: group.id,
            split: policy,
            shares,
            created_at: Utc::now(),
        };
        expenses.push(expense.clone());

        log::info!(
            "recorded expense {} ({} {}) in group {}: {} obligations",
            expense.id,
            expense.split.kind(),
            expense.amount,
            expense.group_id,
            obligations.len()
        );
        Ok(expense)
    }

    /// Outstanding balances of a group, with display names.
    ///
    /// Balances whose ower or lender is not a registered user are left out.
    pub fn get_balances(&self, group: GroupId) -> Result<Vec<BalanceView>, TrackerError> {
        let users = self.users.read().map_err(|_| TrackerError::Poisoned)?;
        let ledger = self.ledger.read().map_err(|_| TrackerError::Poisoned)?;

        Ok(ledger
            .entries(group)
            .filter_map(|(key, amount)| {
                let ower = users.name_of(key.ower)?;
                let lender = users.name_of(key.lender)?;
                Some(BalanceView {
                    ower: ower.to_string(),
                    lender: lender.to_string(),
                    amount: round_for_display(amount, self.config.display_decimals),
                })
            })
            .collect())
    }

    /// Balances of every registered group, in group order.
    pub fn all_balances(&self) -> Result<Vec<GroupBalances>, TrackerError> {
        self.groups()?
            .into_iter()
            .map(|group| {
                Ok(GroupBalances {
                    balances: self.get_balances(group.id)?,
                    group: group.id,
                    name: group.name,
                })
            })
            .collect()
    }

    pub fn group(&self, id: GroupId) -> Result<Option<Group>, TrackerError> {
        let groups = self.groups.read().map_err(|_| TrackerError::Poisoned)?;
        Ok(groups.get(id).cloned())
    }

    pub fn groups(&self) -> Result<Vec<Group>, TrackerError> {
        let groups = self.groups.read().map_err(|_| TrackerError::Poisoned)?;
        Ok(groups.all().to_vec())
    }

    pub fn expense(&self, id: ExpenseId) -> Result<Option<Expense>, TrackerError> {
        let expenses = self.expenses.read().map_err(|_| TrackerError::Poisoned)?;
        Ok(expenses.get(id).cloned())
    }

    pub fn expenses_for(&self, group: GroupId) -> Result<Vec<Expense>, TrackerError> {
        let expenses = self.expenses.read().map_err(|_| TrackerError::Poisoned)?;
        Ok(expenses.for_group(group).cloned().collect())
    }

    /// A copy of the ledger as it stands now.
    pub fn ledger_snapshot(&self) -> Result<Ledger, TrackerError> {
        let ledger = self.ledger.read().map_err(|_| TrackerError::Poisoned)?;
        Ok(ledger.clone())
    }

    fn check_membership(
        group: &Group,
        valid: &ValidExpense,
        policy: &SplitPolicy,
    ) -> Result<(), TrackerError> {
        let named: Vec<ParticipantId> = match policy {
            SplitPolicy::Equal => valid.split_details.participants.clone().unwrap_or_default(),
            SplitPolicy::Exact(map) | SplitPolicy::Percentage(map) => map.keys().copied().collect(),
        };

        std::iter::once(valid.paid_by)
            .chain(named)
            .find(|p| !group.is_member(*p))
            .map_or(Ok(()), |outsider| {
                Err(TrackerError::InvalidInput(format!(
                    "participant {} is not a member of group {}",
                    outsider, group.id
                )))
            })
    }
}
