use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use split_ledger::config::TrackerConfig;
use split_ledger::core::amount::within_tolerance;
use split_ledger::core::ids::{GroupId, ParticipantId};
use split_ledger::core::ledger::{BalanceEntry, Ledger};
use split_ledger::request::{NewExpense, NewGroup, NewUser};
use split_ledger::scenario::{RequestKind, Scenario, ScenarioError};
use split_ledger::split::calculator::SplitError;
use split_ledger::tracker::{ExpenseTracker, TrackerError};
use std::sync::Arc;
use std::thread;

fn p(id: u64) -> ParticipantId {
    ParticipantId::new(id)
}

fn trip_tracker() -> (ExpenseTracker, GroupId) {
    let tracker = ExpenseTracker::new();
    for name in ["Ana", "Ben", "Cy", "Dee"] {
        tracker.create_user(NewUser::new(name)).unwrap();
    }
    let group = tracker
        .create_group(NewGroup::new("Lisbon", [1, 2, 3, 4, 2]))
        .unwrap();
    (tracker, group.id)
}

/// A week of trip expenses: the ledger must end up holding exactly the
/// net debt between each pair.
#[test]
fn full_trip_nets_pairwise_debts() {
    let (tracker, g) = trip_tracker();

    // Ana pays 120 for everyone: Ben, Cy, Dee owe Ana 30 each.
    tracker
        .create_expense(NewExpense::new("Apartment", dec!(120), 1, g.get(), "EQUAL"))
        .unwrap();
    // Ben pays 80 split 50/25/25 with Ana and Cy: Ana owes Ben 40, Cy owes Ben 20.
    tracker
        .create_expense(
            NewExpense::new("Boat tour", dec!(80), 2, g.get(), "PERCENTAGE")
                .with_percentages([(1, dec!(50)), (2, dec!(25)), (3, dec!(25))]),
        )
        .unwrap();
    // Cy pays 45 exact: Ana 15, Dee 30.
    tracker
        .create_expense(
            NewExpense::new("Dinner", dec!(45), 3, g.get(), "EXACT")
                .with_amounts([(1, dec!(15)), (4, dec!(30))]),
        )
        .unwrap();

    let ledger = tracker.ledger_snapshot().unwrap();
    assert!(ledger.is_minimal());

    // Ben/Ana: Ben owed 30, Ana owed 40 -> Ana owes Ben 10.
    assert_eq!(ledger.net_between(g, p(1), p(2)), dec!(10));
    // Cy/Ana: Cy owed 30, Ana owed 15 -> Cy owes Ana 15.
    assert_eq!(ledger.net_between(g, p(3), p(1)), dec!(15));
    // Dee/Ana: 30. Dee/Cy: 30. Cy/Ben: 20.
    assert_eq!(ledger.balance(g, p(4), p(1)), dec!(30));
    assert_eq!(ledger.balance(g, p(4), p(3)), dec!(30));
    assert_eq!(ledger.balance(g, p(3), p(2)), dec!(20));

    let names: Vec<(String, String, Decimal)> = tracker
        .get_balances(g)
        .unwrap()
        .into_iter()
        .map(|b| (b.ower, b.lender, b.amount))
        .collect();
    assert_eq!(
        names,
        vec![
            ("Ana".to_string(), "Ben".to_string(), dec!(10)),
            ("Cy".to_string(), "Ana".to_string(), dec!(15)),
            ("Cy".to_string(), "Ben".to_string(), dec!(20)),
            ("Dee".to_string(), "Ana".to_string(), dec!(30)),
            ("Dee".to_string(), "Cy".to_string(), dec!(30)),
        ]
    );

    // Net positions sum to zero across the group.
    let total: Decimal = (1..=4).map(|id| ledger.net_position(g, p(id))).sum();
    assert_eq!(total, Decimal::ZERO);
}

#[test]
fn cancellation_cases_from_a_shared_start() {
    let g = GroupId::new(1);
    let start = {
        let mut ledger = Ledger::new();
        ledger.record_obligation(g, p(1), p(2), dec!(10));
        ledger
    };

    let mut partial = start.clone();
    partial.record_obligation(g, p(2), p(1), dec!(4));
    assert_eq!(
        partial.query_balances(g),
        vec![BalanceEntry {
            ower: p(1),
            lender: p(2),
            amount: dec!(6)
        }]
    );

    let mut full = start.clone();
    full.record_obligation(g, p(2), p(1), dec!(10));
    assert!(full.query_balances(g).is_empty());

    let mut reversed = start;
    reversed.record_obligation(g, p(2), p(1), dec!(15));
    assert_eq!(
        reversed.query_balances(g),
        vec![BalanceEntry {
            ower: p(2),
            lender: p(1),
            amount: dec!(5)
        }]
    );
}

#[test]
fn exact_split_of_ninety_nine_is_rejected() {
    let (tracker, g) = trip_tracker();
    let result = tracker.create_expense(
        NewExpense::new("Museum", dec!(100), 1, g.get(), "EXACT")
            .with_amounts([(2, dec!(33)), (3, dec!(33)), (4, dec!(33))]),
    );
    assert_eq!(
        result,
        Err(TrackerError::Split(SplitError::SplitMismatch {
            expected: dec!(100),
            actual: dec!(99),
        }))
    );
    assert!(tracker.ledger_snapshot().unwrap().is_empty());
    assert!(tracker.expenses_for(g).unwrap().is_empty());
}

#[test]
fn equal_thirds_conserve_the_amount() {
    let tracker = ExpenseTracker::new();
    for name in ["Ana", "Ben", "Cy"] {
        tracker.create_user(NewUser::new(name)).unwrap();
    }
    let g = tracker.create_group(NewGroup::new("Flat", [1, 2, 3])).unwrap().id;
    let expense = tracker
        .create_expense(NewExpense::new("Internet", dec!(100), 1, g.get(), "EQUAL"))
        .unwrap();

    let total: Decimal = expense.shares.values().sum();
    assert!(within_tolerance(total, dec!(100)));

    let balances = tracker.get_balances(g).unwrap();
    assert_eq!(balances.len(), 2);
    assert!(balances.iter().all(|b| b.amount == dec!(33.33)));
}

#[test]
fn stored_expense_keeps_its_shares() {
    let (tracker, g) = trip_tracker();
    let expense = tracker
        .create_expense(NewExpense::new("Taxi", dec!(30), 2, g.get(), "EQUAL").with_participants([2, 3]))
        .unwrap();

    let stored = tracker.expense(expense.id).unwrap().unwrap();
    assert_eq!(stored, expense);
    assert_eq!(stored.shares.len(), 2);
    assert_eq!(stored.shares[&p(3)], dec!(15));
}

#[test]
fn scenario_file_round_trip_through_tracker() {
    let json = r#"{
        "users": [{ "name": "Ana" }, { "name": "Ben" }, { "name": "Cy" }],
        "groups": [{ "name": "Trip", "userIds": [1, 2, 3] }],
        "expenses": [
            { "description": "Fuel", "amount": 90, "paidBy": 1, "groupId": 1, "splitType": "EQUAL" },
            { "description": "Hotel", "amount": 100, "paidBy": 1, "groupId": 1, "splitType": "PERCENTAGE",
              "splitDetails": { "percentages": { "2": 60, "3": 40 } } }
        ]
    }"#;
    let scenario = Scenario::from_json(json).unwrap();
    let tracker = ExpenseTracker::new();
    let report = scenario.apply(&tracker).unwrap();
    assert_eq!(report.expenses, 2);

    let ledger = tracker.ledger_snapshot().unwrap();
    assert_eq!(ledger.balance(GroupId::new(1), p(2), p(1)), dec!(90));
    assert_eq!(ledger.balance(GroupId::new(1), p(3), p(1)), dec!(70));

    let output = serde_json::to_value(tracker.all_balances().unwrap()).unwrap();
    assert_eq!(output[0]["name"], "Trip");
    assert_eq!(output[0]["balances"][0]["ower"], "Ben");
    assert_eq!(output[0]["balances"][0]["amount"], "90");
}

#[test]
fn concurrent_recording_matches_sequential_totals() {
    let (tracker, g) = trip_tracker();
    let tracker = Arc::new(tracker);

    let handles: Vec<_> = (1..=4u64)
        .map(|payer| {
            let tracker = Arc::clone(&tracker);
            thread::spawn(move || {
                for _ in 0..25 {
                    tracker
                        .create_expense(NewExpense::new("Round", dec!(40), payer, g.get(), "EQUAL"))
                        .unwrap();
                    let ledger = tracker.ledger_snapshot().unwrap();
                    assert!(ledger.is_minimal());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // Everyone paid the same rounds for everyone: all debts cancel.
    assert!(tracker.ledger_snapshot().unwrap().is_empty());
    assert_eq!(tracker.expenses_for(g).unwrap().len(), 100);
}

#[test]
fn membership_check_is_opt_in() {
    let config = TrackerConfig::from_json(r#"{ "require_group_members": true }"#).unwrap();
    let tracker = ExpenseTracker::with_config(config);
    for name in ["Ana", "Ben", "Cy"] {
        tracker.create_user(NewUser::new(name)).unwrap();
    }
    let g = tracker.create_group(NewGroup::new("Pair", [1, 2])).unwrap().id;

    let outsider_payer = tracker.create_expense(NewExpense::new("Cab", dec!(10), 3, g.get(), "EQUAL"));
    assert!(matches!(outsider_payer, Err(TrackerError::InvalidInput(_))));

    let members_only = tracker.create_expense(NewExpense::new("Cab", dec!(10), 1, g.get(), "EQUAL"));
    assert!(members_only.is_ok());
}

#[test]
fn oversized_exact_shares_are_rejected_without_poisoning() {
    let json = r#"{
        "users": [{ "name": "Ana" }, { "name": "Ben" }, { "name": "Cy" }],
        "groups": [{ "name": "Trip", "userIds": [1, 2, 3] }],
        "expenses": [
            { "description": "Island", "amount": "70000000000000000000000000000", "paidBy": 1,
              "groupId": 1, "splitType": "EXACT",
              "splitDetails": { "amounts": {
                  "2": "70000000000000000000000000000",
                  "3": "70000000000000000000000000000" } } }
        ]
    }"#;
    let tracker = ExpenseTracker::new();
    let result = Scenario::from_json(json).unwrap().apply(&tracker);
    assert!(matches!(
        result,
        Err(ScenarioError::Rejected {
            kind: RequestKind::Expense,
            index: 0,
            source: TrackerError::Split(SplitError::InvalidInput(_)),
        })
    ));

    let g = GroupId::new(1);
    tracker
        .create_expense(NewExpense::new("Fuel", dec!(30), 1, g.get(), "EQUAL"))
        .unwrap();
    assert_eq!(tracker.get_balances(g).unwrap().len(), 2);
}
