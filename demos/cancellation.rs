//! Walk through the three ways an obligation meets an opposing balance.

use rust_decimal_macros::dec;
use split_ledger::core::ids::{GroupId, ParticipantId};
use split_ledger::core::ledger::Ledger;

fn main() {
    let g = GroupId::new(1);
    let a = ParticipantId::new(1);
    let b = ParticipantId::new(2);

    for (label, incoming) in [("partial", dec!(4)), ("exact", dec!(10)), ("reversal", dec!(15))] {
        let mut ledger = Ledger::new();
        ledger.record_obligation(g, a, b, dec!(10));

        let outcome = ledger.record_obligation(g, b, a, incoming);
        println!("━━━ {}: #{} owes #{} 10, then #{} owes #{} {} ━━━", label, a, b, b, a, incoming);
        println!("  outcome: {:?}", outcome);
        for entry in ledger.query_balances(g) {
            println!("  #{} owes #{} {}", entry.ower, entry.lender, entry.amount);
        }
        if ledger.is_empty() {
            println!("  (no balances)");
        }
        println!();
    }
}
