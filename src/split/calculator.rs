use crate::core::amount::within_tolerance;
use crate::core::ids::ParticipantId;
use crate::split::policy::SplitPolicy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Participant -> amount owed toward one expense.
pub type ShareMap = BTreeMap<ParticipantId, Decimal>;

/// Errors arising from turning an expense into shares.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("split does not add up: expected {expected}, got {actual}")]
    SplitMismatch { expected: Decimal, actual: Decimal },
    #[error("invalid split type: {0}")]
    InvalidPolicy(String),
}

/// Computes per-participant shares of an expense.
///
/// Pure: no state is read or written, so shares are always computed in
/// full before the ledger sees any of them.
pub struct SplitCalculator;

impl SplitCalculator {
    /// Split `amount` according to `policy`.
    ///
    /// `participants` is only consulted by [`SplitPolicy::Equal`]; callers
    /// pass the group's members unless the expense names a subset. Exact
    /// and percentage splits take their participants from their own
    /// parameters and need not cover the whole group.
    ///
    /// # Examples
    ///
    /// ```
    /// use split_ledger::core::ids::ParticipantId;
    /// use split_ledger::split::calculator::SplitCalculator;
    /// use split_ledger::split::policy::SplitPolicy;
    /// use rust_decimal_macros::dec;
    ///
    /// let members = [1, 2, 3].map(ParticipantId::new);
    /// let shares = SplitCalculator::compute_shares(dec!(90), &SplitPolicy::Equal, &members).unwrap();
    /// assert!(shares.values().all(|s| *s == dec!(30)));
    /// ```
    pub fn compute_shares(
        amount: Decimal,
        policy: &SplitPolicy,
        participants: &[ParticipantId],
    ) -> Result<ShareMap, SplitError> {
        if amount <= Decimal::ZERO {
            return Err(SplitError::InvalidInput(format!(
                "amount must be positive, got {}",
                amount
            )));
        }

        match policy {
            SplitPolicy::Equal => Self::equal(amount, participants),
            SplitPolicy::Exact(amounts) => Self::exact(amount, amounts),
            SplitPolicy::Percentage(percentages) => Self::percentage(amount, percentages),
        }
    }

    fn equal(amount: Decimal, participants: &[ParticipantId]) -> Result<ShareMap, SplitError> {
        let unique: BTreeSet<ParticipantId> = participants.iter().copied().collect();
        if unique.is_empty() {
            return Err(SplitError::InvalidInput(
                "EQUAL split needs at least one participant".to_string(),
            ));
        }

        let share = amount / Decimal::from(unique.len());
        Ok(unique.into_iter().map(|p| (p, share)).collect())
    }

    fn exact(amount: Decimal, amounts: &ShareMap) -> Result<ShareMap, SplitError> {
        Self::reject_negative(amounts, "amount")?;

        let total = Self::checked_total(amounts, "amounts")?;
        if !within_tolerance(total, amount) {
            return Err(SplitError::SplitMismatch {
                expected: amount,
                actual: total,
            });
        }
        Ok(amounts.clone())
    }

    fn percentage(amount: Decimal, percentages: &ShareMap) -> Result<ShareMap, SplitError> {
        Self::reject_negative(percentages, "percentage")?;

        let hundred = dec!(100);
        let total = Self::checked_total(percentages, "percentages")?;
        if !within_tolerance(total, hundred) {
            return Err(SplitError::SplitMismatch {
                expected: hundred,
                actual: total,
            });
        }
        percentages
            .iter()
            .map(|(p, pct)| {
                amount
                    .checked_mul(*pct)
                    .and_then(|v| v.checked_div(hundred))
                    .map(|share| (*p, share))
                    .ok_or_else(|| {
                        SplitError::InvalidInput(format!(
                            "share of participant {} in {} overflows",
                            p, amount
                        ))
                    })
            })
            .collect()
    }

    fn checked_total(values: &ShareMap, what: &str) -> Result<Decimal, SplitError> {
        values
            .values()
            .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
            .ok_or_else(|| SplitError::InvalidInput(format!("sum of {} overflows", what)))
    }

    fn reject_negative(values: &ShareMap, what: &str) -> Result<(), SplitError> {
        match values.iter().find(|(_, v)| **v < Decimal::ZERO) {
            Some((participant, value)) => Err(SplitError::InvalidInput(format!(
                "negative {} {} for participant {}",
                what, value, participant
            ))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(id: u64) -> ParticipantId {
        ParticipantId::new(id)
    }

    fn members() -> Vec<ParticipantId> {
        vec![p(1), p(2), p(3)]
    }

    #[test]
    fn test_equal_split() {
        let shares = SplitCalculator::compute_shares(dec!(90), &SplitPolicy::Equal, &members()).unwrap();
        assert_eq!(
            shares,
            BTreeMap::from([(p(1), dec!(30)), (p(2), dec!(30)), (p(3), dec!(30))])
        );
    }

    #[test]
    fn test_equal_split_conserves_amount() {
        let shares = SplitCalculator::compute_shares(dec!(100), &SplitPolicy::Equal, &members()).unwrap();
        let total: Decimal = shares.values().sum();
        assert!(within_tolerance(total, dec!(100)));
    }

    #[test]
    fn test_equal_split_collapses_duplicates() {
        let shares =
            SplitCalculator::compute_shares(dec!(50), &SplitPolicy::Equal, &[p(2), p(3), p(2)]).unwrap();
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[&p(2)], dec!(25));
    }

    #[test]
    fn test_equal_split_without_participants() {
        let result = SplitCalculator::compute_shares(dec!(90), &SplitPolicy::Equal, &[]);
        assert!(matches!(result, Err(SplitError::InvalidInput(_))));
    }

    #[test]
    fn test_exact_split_used_verbatim() {
        let amounts = BTreeMap::from([(p(2), dec!(70)), (p(3), dec!(30))]);
        let shares =
            SplitCalculator::compute_shares(dec!(100), &SplitPolicy::Exact(amounts.clone()), &members())
                .unwrap();
        assert_eq!(shares, amounts);
    }

    #[test]
    fn test_exact_split_mismatch() {
        let amounts = BTreeMap::from([(p(2), dec!(69)), (p(3), dec!(30))]);
        let result = SplitCalculator::compute_shares(dec!(100), &SplitPolicy::Exact(amounts), &members());
        assert_eq!(
            result,
            Err(SplitError::SplitMismatch {
                expected: dec!(100),
                actual: dec!(99),
            })
        );
    }

    #[test]
    fn test_exact_split_within_tolerance() {
        let amounts = BTreeMap::from([(p(2), dec!(33.33)), (p(3), dec!(66.66))]);
        assert!(SplitCalculator::compute_shares(dec!(100), &SplitPolicy::Exact(amounts), &members()).is_ok());
    }

    #[test]
    fn test_percentage_split() {
        let pcts = BTreeMap::from([(p(2), dec!(60)), (p(3), dec!(40))]);
        let shares =
            SplitCalculator::compute_shares(dec!(100), &SplitPolicy::Percentage(pcts), &members()).unwrap();
        assert_eq!(shares, BTreeMap::from([(p(2), dec!(60)), (p(3), dec!(40))]));
    }

    #[test]
    fn test_percentage_must_total_hundred() {
        let pcts = BTreeMap::from([(p(2), dec!(60)), (p(3), dec!(30))]);
        let result = SplitCalculator::compute_shares(dec!(100), &SplitPolicy::Percentage(pcts), &members());
        assert!(matches!(result, Err(SplitError::SplitMismatch { .. })));
    }

    #[test]
    fn test_negative_parameters_rejected() {
        let pcts = BTreeMap::from([(p(2), dec!(120)), (p(3), dec!(-20))]);
        let result = SplitCalculator::compute_shares(dec!(100), &SplitPolicy::Percentage(pcts), &members());
        assert!(matches!(result, Err(SplitError::InvalidInput(_))));
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let result = SplitCalculator::compute_shares(Decimal::ZERO, &SplitPolicy::Equal, &members());
        assert!(matches!(result, Err(SplitError::InvalidInput(_))));
    }

    fn huge(units: i128, exponent: u32) -> Decimal {
        Decimal::from_i128_with_scale(units * 10i128.pow(exponent), 0)
    }

    #[test]
    fn test_percentage_overflow_is_invalid_input() {
        let pcts = BTreeMap::from([(p(2), dec!(100))]);
        let result = SplitCalculator::compute_shares(huge(1, 27), &SplitPolicy::Percentage(pcts), &members());
        assert!(matches!(result, Err(SplitError::InvalidInput(_))));
    }

    #[test]
    fn test_exact_total_overflow_is_invalid_input() {
        let amounts = BTreeMap::from([(p(2), huge(7, 28)), (p(3), huge(7, 28))]);
        let result = SplitCalculator::compute_shares(huge(7, 28), &SplitPolicy::Exact(amounts), &members());
        assert!(matches!(result, Err(SplitError::InvalidInput(_))));
    }
}
