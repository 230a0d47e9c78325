//! split-ledger CLI
//!
//! Replay expense scenarios and print who owes whom.
//!
//! # Usage
//!
//! ```bash
//! # Apply a scenario file and print balances per group
//! split-ledger run --input trip.json
//!
//! # Output as JSON, with a config file
//! split-ledger run --input trip.json --format json --config tracker.json
//!
//! # Generate a random scenario for testing
//! split-ledger generate --users 8 --groups 2 --expenses 40 --seed 7
//! ```

use split_ledger::config::TrackerConfig;
use split_ledger::scenario::{Rejection, Scenario};
use split_ledger::simulation::stress_test::{generate_random_scenario, ScenarioConfig};
use split_ledger::tracker::{ExpenseTracker, GroupBalances};
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"split-ledger — shared expense splitting with a netted debt ledger

USAGE:
    split-ledger <COMMAND> [OPTIONS]

COMMANDS:
    run         Apply a scenario file and print balances per group
    generate    Generate a random scenario (for testing)
    help        Show this message

OPTIONS (run):
    --input <FILE>      Path to JSON scenario file
    --format <FORMAT>   Output format: text (default) or json
    --config <FILE>     Path to JSON tracker config

OPTIONS (generate):
    --users <N>         Number of users (default: 10)
    --groups <N>        Number of groups (default: 2)
    --group-size <N>    Members per group (default: 4)
    --expenses <N>      Number of expenses (default: 50)
    --seed <N>          Seed for a reproducible scenario
    --output <FILE>     Write to file instead of stdout

Set RUST_LOG=info (or debug) to trace every recorded obligation.

EXAMPLES:
    split-ledger run --input trip.json
    split-ledger run --input trip.json --format json
    split-ledger generate --users 5 --expenses 20 --output trip.json"#
    );
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// JSON output schema for `run`.
#[derive(serde::Serialize)]
struct RunOutput {
    success: bool,
    groups: Vec<GroupBalances>,
    rejected: Vec<RejectionOutput>,
}

#[derive(serde::Serialize)]
struct RejectionOutput {
    kind: String,
    index: usize,
    error: String,
}

impl From<&Rejection> for RejectionOutput {
    fn from(rejection: &Rejection) -> Self {
        Self {
            kind: rejection.kind.to_string(),
            index: rejection.index,
            error: rejection.error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{}': expected 'text' or 'json'", other)),
        }
    }
}

fn option_value(args: &[String], i: usize, flag: &str, what: &str) -> String {
    args.get(i)
        .cloned()
        .unwrap_or_else(|| fail(format!("{} requires {}", flag, what)))
}

fn numeric_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    args.get(i)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| fail(format!("{} requires a number", flag)))
}

fn cmd_run(args: &[String]) {
    let mut input_path = None;
    let mut config_path = None;
    let mut format = OutputFormat::Text;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(option_value(args, i, "--input", "a file path"));
            }
            "--config" => {
                i += 1;
                config_path = Some(option_value(args, i, "--config", "a file path"));
            }
            "--format" => {
                i += 1;
                format = option_value(args, i, "--format", "'text' or 'json'")
                    .parse()
                    .unwrap_or_else(|e: String| fail(e));
            }
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| fail("--input <FILE> is required"));
    let config = match config_path {
        Some(path) => TrackerConfig::load(&path).unwrap_or_else(|e| fail(e)),
        None => TrackerConfig::default(),
    };
    let decimals = config.display_decimals as usize;

    let scenario = Scenario::load(&path).unwrap_or_else(|e| fail(e));
    let tracker = ExpenseTracker::with_config(config);
    let report = scenario.apply(&tracker).unwrap_or_else(|e| fail(e));
    let groups = tracker.all_balances().unwrap_or_else(|e| fail(e));

    if format == OutputFormat::Json {
        let output = RunOutput {
            success: report.rejected.is_empty(),
            groups,
            rejected: report.rejected.iter().map(RejectionOutput::from).collect(),
        };
        let json = serde_json::to_string_pretty(&output).unwrap_or_else(|e| fail(e));
        println!("{}", json);
        return;
    }

    println!(
        "Applied {} users, {} groups, {} expenses",
        report.users, report.groups, report.expenses
    );
    for rejection in &report.rejected {
        println!("  rejected {} #{}: {}", rejection.kind, rejection.index, rejection.error);
    }
    for group in &groups {
        println!("\n=== Group {}: {} ===", group.group, group.name);
        if group.balances.is_empty() {
            println!("  All settled.");
        }
        for balance in &group.balances {
            println!(
                "  {:<15} owes {:<15} {:>12.*}",
                balance.ower, balance.lender, decimals, balance.amount
            );
        }
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = ScenarioConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--users" => {
                i += 1;
                config.user_count = numeric_value(args, i, "--users");
            }
            "--groups" => {
                i += 1;
                config.group_count = numeric_value(args, i, "--groups");
            }
            "--group-size" => {
                i += 1;
                config.group_size = numeric_value(args, i, "--group-size");
            }
            "--expenses" => {
                i += 1;
                config.expense_count = numeric_value(args, i, "--expenses");
            }
            "--seed" => {
                i += 1;
                config.seed = Some(numeric_value(args, i, "--seed"));
            }
            "--output" => {
                i += 1;
                output_path = Some(option_value(args, i, "--output", "a file path"));
            }
            other => fail(format!("unknown option: {}", other)),
        }
        i += 1;
    }

    let scenario = generate_random_scenario(&config);
    let json = scenario.to_json_pretty().unwrap_or_else(|e| fail(e));

    if let Some(path) = output_path {
        fs::write(&path, &json)
            .unwrap_or_else(|e| fail(format!("cannot write to '{}': {}", path, e)));
        eprintln!(
            "Generated {} expenses across {} groups → {}",
            scenario.expenses.len(),
            scenario.groups.len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "run" => cmd_run(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
