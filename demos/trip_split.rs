//! Record a weekend trip and print who owes whom.
//!
//! Demonstrates the three splitting policies and how later expenses net
//! against earlier ones.

use rust_decimal_macros::dec;
use split_ledger::request::{NewExpense, NewGroup, NewUser};
use split_ledger::tracker::ExpenseTracker;

fn main() {
    println!("╔══════════════════════════════════════╗");
    println!("║  split-ledger: Weekend Trip Example  ║");
    println!("╚══════════════════════════════════════╝\n");

    let tracker = ExpenseTracker::new();
    for name in ["Ana", "Ben", "Cy"] {
        tracker.create_user(NewUser::new(name)).expect("user");
    }
    let trip = tracker
        .create_group(NewGroup::new("Weekend trip", [1, 2, 3]))
        .expect("group");

    let expenses = [
        NewExpense::new("Cabin", dec!(300), 1, trip.id.get(), "EQUAL"),
        NewExpense::new("Groceries", dec!(90), 2, trip.id.get(), "PERCENTAGE")
            .with_percentages([(1, dec!(50)), (2, dec!(25)), (3, dec!(25))]),
        NewExpense::new("Kayaks", dec!(70), 3, trip.id.get(), "EXACT")
            .with_amounts([(1, dec!(40)), (3, dec!(30))]),
    ];

    for request in expenses {
        let expense = tracker.create_expense(request).expect("expense");
        println!(
            "━━━ {} ({} {}) paid by #{} ━━━",
            expense.description,
            expense.split.kind(),
            expense.amount,
            expense.paid_by
        );
        for (participant, share) in &expense.shares {
            println!("    #{:<3} share {:>8.2}", participant.get(), share);
        }

        for balance in tracker.get_balances(trip.id).expect("balances") {
            println!("  {:<5} owes {:<5} {:>8.2}", balance.ower, balance.lender, balance.amount);
        }
        println!();
    }
}
