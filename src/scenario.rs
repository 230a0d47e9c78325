//! Batches of requests replayed against a tracker.
//!
//! A scenario file lists users, then groups, then expenses, in the JSON
//! shapes of [`crate::request`]. Ids are assigned in file order starting
//! at 1, so later entries can refer to earlier ones by position.

use crate::request::{NewExpense, NewGroup, NewUser};
use crate::tracker::{ExpenseTracker, TrackerError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("cannot read scenario '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{kind} #{index} rejected: {source}")]
    Rejected {
        kind: RequestKind,
        index: usize,
        #[source]
        source: TrackerError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    User,
    Group,
    Expense,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::User => f.write_str("user"),
            RequestKind::Group => f.write_str("group"),
            RequestKind::Expense => f.write_str("expense"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub users: Vec<NewUser>,
    pub groups: Vec<NewGroup>,
    pub expenses: Vec<NewExpense>,
}

/// A request the tracker turned down while a scenario was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub kind: RequestKind,
    pub index: usize,
    pub error: TrackerError,
}

/// What applying a scenario did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioReport {
    pub users: usize,
    pub groups: usize,
    pub expenses: usize,
    pub rejected: Vec<Rejection>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn to_json_pretty(&self) -> Result<String, ScenarioError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Feed every request to `tracker`, users first.
    ///
    /// Stops at the first rejection unless the tracker is configured with
    /// `continue_on_error`, in which case rejections are collected in the
    /// report.
    pub fn apply(&self, tracker: &ExpenseTracker) -> Result<ScenarioReport, ScenarioError> {
        let keep_going = tracker.config().continue_on_error;
        let mut report = ScenarioReport::default();

        for (index, user) in self.users.iter().enumerate() {
            let result = tracker.create_user(user.clone()).map(|_| ());
            if settle(keep_going, RequestKind::User, index, result, &mut report)? {
                report.users += 1;
            }
        }
        for (index, group) in self.groups.iter().enumerate() {
            let result = tracker.create_group(group.clone()).map(|_| ());
            if settle(keep_going, RequestKind::Group, index, result, &mut report)? {
                report.groups += 1;
            }
        }
        for (index, expense) in self.expenses.iter().enumerate() {
            let result = tracker.create_expense(expense.clone()).map(|_| ());
            if settle(keep_going, RequestKind::Expense, index, result, &mut report)? {
                report.expenses += 1;
            }
        }

        log::info!(
            "scenario applied: {} users, {} groups, {} expenses, {} rejected",
            report.users,
            report.groups,
            report.expenses,
            report.rejected.len()
        );
        Ok(report)
    }
}

/// `Ok(true)` if the request went through, `Ok(false)` if it was rejected
/// and recorded.
fn settle(
    keep_going: bool,
    kind: RequestKind,
    index: usize,
    result: Result<(), TrackerError>,
    report: &mut ScenarioReport,
) -> Result<bool, ScenarioError> {
    match result {
        Ok(()) => Ok(true),
        Err(error) if keep_going => {
            log::warn!("{} #{} rejected: {}", kind, index, error);
            report.rejected.push(Rejection { kind, index, error });
            Ok(false)
        }
        Err(source) => Err(ScenarioError::Rejected {
            kind,
            index,
            source,
        }),
    }
}
