//! Money helpers shared by the split calculator and the ledger.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// Smallest difference between two amounts that is treated as real.
///
/// Used both when checking that split parameters add up and when deciding
/// whether a partially cancelled balance is gone. Keep the two in step by
/// never introducing a second threshold.
pub const TOLERANCE: Decimal = dec!(0.01);

/// Decimal places used when presenting balances.
pub const DISPLAY_DECIMALS: u32 = 2;

/// `true` if `a` and `b` differ by no more than [`TOLERANCE`].
///
/// ```
/// use split_ledger::core::amount::within_tolerance;
/// use rust_decimal_macros::dec;
///
/// assert!(within_tolerance(dec!(99.995), dec!(100)));
/// assert!(!within_tolerance(dec!(99), dec!(100)));
/// ```
pub fn within_tolerance(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() <= TOLERANCE
}

/// `true` if `amount` is too small to be kept as a balance.
pub fn is_residue(amount: Decimal) -> bool {
    amount < TOLERANCE
}

/// Round an amount for presentation, halves away from zero.
pub fn round_for_display(amount: Decimal, decimals: u32) -> Decimal {
    amount.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
}
