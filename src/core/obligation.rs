use crate::core::ids::{ExpenseId, GroupId, ParticipantId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A directed debt between two participants of one group.
///
/// Represents the fact that `ower` owes `lender` a specific `amount`
/// within `group`. Obligations are derived from the shares of an expense
/// and folded into the [`Ledger`](crate::core::ledger::Ledger) one at a time.
///
/// # Examples
///
/// ```
/// use split_ledger::core::ids::{GroupId, ParticipantId};
/// use split_ledger::core::obligation::Obligation;
/// use rust_decimal_macros::dec;
///
/// let obligation = Obligation::new(
///     GroupId::new(1),
///     ParticipantId::new(2),
///     ParticipantId::new(1),
///     dec!(30),
/// )
/// .unwrap();
///
/// assert_eq!(obligation.amount(), dec!(30));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obligation {
    /// Group the debt belongs to.
    group: GroupId,
    /// The participant that owes the amount.
    ower: ParticipantId,
    /// The participant that is owed the amount.
    lender: ParticipantId,
    /// The amount owed. Always positive.
    amount: Decimal,
    /// Expense this obligation was derived from, if any.
    expense: Option<ExpenseId>,
}

impl Obligation {
    /// Create a new obligation.
    ///
    /// Returns `None` when nothing is owed: a non-positive amount or an
    /// ower who is also the lender.
    pub fn new(
        group: GroupId,
        ower: ParticipantId,
        lender: ParticipantId,
        amount: Decimal,
    ) -> Option<Self> {
        if amount <= Decimal::ZERO || ower == lender {
            return None;
        }
        Some(Self {
            group,
            ower,
            lender,
            amount,
            expense: None,
        })
    }

    /// Tag the obligation with the expense it came from.
    pub fn with_expense(mut self, expense: ExpenseId) -> Self {
        self.expense = Some(expense);
        self
    }

    // --- Accessors ---

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn ower(&self) -> ParticipantId {
        self.ower
    }

    pub fn lender(&self) -> ParticipantId {
        self.lender
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn expense(&self) -> Option<ExpenseId> {
        self.expense
    }
}

/// The obligations produced by one expense, in the order they are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObligationSet {
    obligations: Vec<Obligation>,
}

impl ObligationSet {
    /// Derive the obligations of an expense from its share mapping.
    ///
    /// Every participant other than the payer owes the payer their share.
    /// The payer's own share and zero shares produce nothing.
    pub fn from_shares(
        group: GroupId,
        payer: ParticipantId,
        shares: &BTreeMap<ParticipantId, Decimal>,
    ) -> Self {
        shares
            .iter()
            .filter(|(participant, _)| **participant != payer)
            .filter_map(|(participant, share)| Obligation::new(group, *participant, payer, *share))
            .collect()
    }

    pub fn obligations(&self) -> &[Obligation] {
        &self.obligations
    }

    pub fn len(&self) -> usize {
        self.obligations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obligations.is_empty()
    }

    /// Tag every obligation with the expense it came from.
    pub fn for_expense(self, expense: ExpenseId) -> Self {
        self.obligations
            .into_iter()
            .map(|o| o.with_expense(expense))
            .collect()
    }
}

impl FromIterator<Obligation> for ObligationSet {
    fn from_iter<T: IntoIterator<Item = Obligation>>(iter: T) -> Self {
        Self {
            obligations: iter.into_iter().collect(),
        }
    }
}
