use crate::core::ids::{ExpenseId, GroupId, ParticipantId};
use crate::split::calculator::ShareMap;
use crate::split::policy::SplitPolicy;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A recorded expense and the shares it was split into.
///
/// Expenses are immutable once recorded: the shares reflect the policy as
/// applied at creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: ExpenseId,
    pub description: String,
    pub amount: Decimal,
    pub paid_by: ParticipantId,
    pub group_id: GroupId,
    pub split: SplitPolicy,
    pub shares: ShareMap,
    pub created_at: DateTime<Utc>,
}

/// Append-only log of recorded expenses.
#[derive(Debug, Clone, Default)]
pub struct ExpenseLog {
    expenses: Vec<Expense>,
}

impl ExpenseLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next recorded expense will receive.
    pub fn next_id(&self) -> ExpenseId {
        ExpenseId::new(self.expenses.len() as u64 + 1)
    }

    pub fn push(&mut self, expense: Expense) {
        self.expenses.push(expense);
    }

    pub fn get(&self, id: ExpenseId) -> Option<&Expense> {
        self.expenses.iter().find(|e| e.id == id)
    }

    /// Expenses of one group, oldest first.
    pub fn for_group(&self, group: GroupId) -> impl Iterator<Item = &Expense> {
        self.expenses.iter().filter(move |e| e.group_id == group)
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }
}
