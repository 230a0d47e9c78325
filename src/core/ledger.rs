use crate::core::amount::{is_residue, round_for_display, DISPLAY_DECIMALS};
use crate::core::ids::{GroupId, ParticipantId};
use crate::core::obligation::{Obligation, ObligationSet};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Key of a directed balance: `ower` owes `lender` within `group`.
///
/// Field order matters: keys sort by group first, so every balance of a
/// group forms one contiguous range of the ledger.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BalanceKey {
    pub group: GroupId,
    pub ower: ParticipantId,
    pub lender: ParticipantId,
}

impl BalanceKey {
    pub fn new(group: GroupId, ower: ParticipantId, lender: ParticipantId) -> Self {
        Self {
            group,
            ower,
            lender,
        }
    }

    /// The same pair with the direction flipped.
    pub fn reversed(self) -> Self {
        Self {
            group: self.group,
            ower: self.lender,
            lender: self.ower,
        }
    }

    fn group_bounds(group: GroupId) -> (Self, Self) {
        (
            Self::new(group, ParticipantId::MIN, ParticipantId::MIN),
            Self::new(group, ParticipantId::MAX, ParticipantId::MAX),
        )
    }
}

/// One live balance of a group, as returned by [`Ledger::query_balances`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceEntry {
    pub ower: ParticipantId,
    pub lender: ParticipantId,
    pub amount: Decimal,
}

/// What folding one obligation did to the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObligationOutcome {
    /// Nothing owed (non-positive amount or a self-debt); ledger untouched.
    Ignored,
    /// An opposing balance absorbed the obligation and still has `remaining`.
    Reduced { remaining: Decimal },
    /// The opposing balance was cancelled out completely.
    Cleared,
    /// The opposing balance was consumed and the pair now owes the other way.
    Reversed { amount: Decimal },
    /// No opposing balance; the forward balance now stands at `total`.
    Added { total: Decimal },
    /// The forward balance cannot hold the amount; ledger untouched.
    Overflowed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("balance of {ower} towards {lender} in group {group} would overflow")]
    Overflow {
        group: GroupId,
        ower: ParticipantId,
        lender: ParticipantId,
    },
}

/// Net pairwise debts of every group.
///
/// For each unordered pair of participants in a group the ledger holds at
/// most one directed, strictly positive balance. Each incoming obligation
/// is netted against the opposing balance before anything is added, so the
/// stored amount is always the pair's net debt.
///
/// # Examples
///
/// ```
/// use split_ledger::core::ids::{GroupId, ParticipantId};
/// use split_ledger::core::ledger::Ledger;
/// use rust_decimal_macros::dec;
///
/// let g = GroupId::new(1);
/// let a = ParticipantId::new(1);
/// let b = ParticipantId::new(2);
///
/// let mut ledger = Ledger::new();
/// ledger.record_obligation(g, a, b, dec!(10));
/// ledger.record_obligation(g, b, a, dec!(4));
///
/// assert_eq!(ledger.balance(g, a, b), dec!(6));
/// assert_eq!(ledger.balance(g, b, a), dec!(0));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(with = "balances_serde")]
    balances: BTreeMap<BalanceKey, Decimal>,
}

mod balances_serde {
    use super::*;

    #[derive(Serialize, Deserialize)]
    struct Record {
        group: GroupId,
        ower: ParticipantId,
        lender: ParticipantId,
        amount: Decimal,
    }

    pub fn serialize<S: serde::Serializer>(
        balances: &BTreeMap<BalanceKey, Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(balances.iter().map(|(key, amount)| Record {
            group: key.group,
            ower: key.ower,
            lender: key.lender,
            amount: *amount,
        }))
    }

    /// Rejects any record list that breaks the ledger invariants.
    pub fn deserialize<'de, D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<BalanceKey, Decimal>, D::Error> {
        use serde::de::Error;

        let records = Vec::<Record>::deserialize(deserializer)?;
        let mut balances = BTreeMap::new();
        for r in records {
            let key = BalanceKey::new(r.group, r.ower, r.lender);
            if r.amount <= Decimal::ZERO {
                return Err(D::Error::custom(format!(
                    "non-positive balance {} of {} towards {} in group {}",
                    r.amount, r.ower, r.lender, r.group
                )));
            }
            if r.ower == r.lender {
                return Err(D::Error::custom(format!(
                    "self-debt of participant {} in group {}",
                    r.ower, r.group
                )));
            }
            if balances.contains_key(&key.reversed()) {
                return Err(D::Error::custom(format!(
                    "both directions recorded between {} and {} in group {}",
                    r.ower, r.lender, r.group
                )));
            }
            if balances.insert(key, r.amount).is_some() {
                return Err(D::Error::custom(format!(
                    "duplicate balance of {} towards {} in group {}",
                    r.ower, r.lender, r.group
                )));
            }
        }
        Ok(balances)
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one obligation into the ledger, cancelling against the
    /// opposing balance first.
    pub fn record_obligation(
        &mut self,
        group: GroupId,
        ower: ParticipantId,
        lender: ParticipantId,
        amount: Decimal,
    ) -> ObligationOutcome {
        if amount <= Decimal::ZERO {
            return ObligationOutcome::Ignored;
        }
        if ower == lender {
            log::warn!("ignoring self-debt of {} for participant {} in group {}", amount, ower, group);
            return ObligationOutcome::Ignored;
        }

        let key = BalanceKey::new(group, ower, lender);
        let reverse = key.reversed();
        let mut amount = amount;
        let mut reversed = false;

        if let Some(&opposing) = self.balances.get(&reverse) {
            if opposing >= amount {
                let remaining = opposing - amount;
                if is_residue(remaining) {
                    self.balances.remove(&reverse);
                    return ObligationOutcome::Cleared;
                }
                self.balances.insert(reverse, remaining);
                return ObligationOutcome::Reduced { remaining };
            }

            self.balances.remove(&reverse);
            amount -= opposing;
            reversed = true;
        }

        let current = self.balance(group, ower, lender);
        let Some(total) = current.checked_add(amount) else {
            log::warn!(
                "balance of {} towards {} in group {} cannot grow by {}",
                ower,
                lender,
                group,
                amount
            );
            return ObligationOutcome::Overflowed;
        };
        self.balances.insert(key, total);

        if reversed {
            ObligationOutcome::Reversed { amount: total }
        } else {
            ObligationOutcome::Added { total }
        }
    }

    /// Fold an [`Obligation`] into the ledger.
    pub fn apply_obligation(&mut self, obligation: &Obligation) -> ObligationOutcome {
        self.record_obligation(
            obligation.group(),
            obligation.ower(),
            obligation.lender(),
            obligation.amount(),
        )
    }

    /// Fold every obligation of a set, in order, or none of them.
    ///
    /// The touched pairs are folded on a scratch ledger first and only
    /// written back once every obligation has gone through.
    pub fn apply_all(&mut self, obligations: &ObligationSet) -> Result<(), LedgerError> {
        let mut staged = Ledger::new();
        let mut touched = BTreeSet::new();

        for ob in obligations.obligations() {
            let key = BalanceKey::new(ob.group(), ob.ower(), ob.lender());
            for k in [key, key.reversed()] {
                if touched.insert(k) {
                    if let Some(amount) = self.balances.get(&k) {
                        staged.balances.insert(k, *amount);
                    }
                }
            }

            let outcome = staged.apply_obligation(ob);
            log::debug!(
                "group {}: {} -> {} {}: {:?}",
                ob.group(),
                ob.ower(),
                ob.lender(),
                ob.amount(),
                outcome
            );
            if outcome == ObligationOutcome::Overflowed {
                return Err(LedgerError::Overflow {
                    group: ob.group(),
                    ower: ob.ower(),
                    lender: ob.lender(),
                });
            }
        }

        for key in touched {
            match staged.balances.remove(&key) {
                Some(amount) => self.balances.insert(key, amount),
                None => self.balances.remove(&key),
            };
        }
        Ok(())
    }

    /// Every live balance of `group`, rounded for display.
    ///
    /// Ordered by ower, then lender. Empty if the group owes nothing.
    pub fn query_balances(&self, group: GroupId) -> Vec<BalanceEntry> {
        self.query_balances_rounded(group, DISPLAY_DECIMALS)
    }

    /// Like [`query_balances`](Self::query_balances) with a chosen precision.
    pub fn query_balances_rounded(&self, group: GroupId, decimals: u32) -> Vec<BalanceEntry> {
        self.entries(group)
            .map(|(key, amount)| BalanceEntry {
                ower: key.ower,
                lender: key.lender,
                amount: round_for_display(amount, decimals),
            })
            .collect()
    }

    /// Raw, unrounded balances of `group`.
    pub fn entries(&self, group: GroupId) -> impl Iterator<Item = (BalanceKey, Decimal)> + '_ {
        let (start, end) = BalanceKey::group_bounds(group);
        self.balances
            .range(start..=end)
            .map(|(key, amount)| (*key, *amount))
    }

    /// What `ower` owes `lender` in `group`, zero if nothing.
    pub fn balance(&self, group: GroupId, ower: ParticipantId, lender: ParticipantId) -> Decimal {
        self.balances
            .get(&BalanceKey::new(group, ower, lender))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Signed debt of `a` towards `b`: positive if `a` owes `b`.
    pub fn net_between(&self, group: GroupId, a: ParticipantId, b: ParticipantId) -> Decimal {
        self.balance(group, a, b) - self.balance(group, b, a)
    }

    /// Net position of a participant within a group.
    ///
    /// Positive = net creditor, negative = net debtor.
    pub fn net_position(&self, group: GroupId, participant: ParticipantId) -> Decimal {
        self.entries(group)
            .map(|(key, amount)| {
                if key.lender == participant {
                    amount
                } else if key.ower == participant {
                    -amount
                } else {
                    Decimal::ZERO
                }
            })
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Sum of every outstanding balance in a group, saturating at
    /// [`Decimal::MAX`].
    pub fn total_outstanding(&self, group: GroupId) -> Decimal {
        self.entries(group)
            .map(|(_, amount)| amount)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Groups with at least one outstanding balance.
    pub fn groups(&self) -> Vec<GroupId> {
        let mut groups: Vec<GroupId> = self.balances.keys().map(|k| k.group).collect();
        groups.dedup();
        groups
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Check the ledger invariants: positive amounts, no self-debts and at
    /// most one direction per pair.
    pub fn is_minimal(&self) -> bool {
        self.balances.iter().all(|(key, amount)| {
            *amount > Decimal::ZERO
                && key.ower != key.lender
                && !self.balances.contains_key(&key.reversed())
        })
    }
}
