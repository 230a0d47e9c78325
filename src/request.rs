//! Incoming requests, in the JSON shape clients send them.
//!
//! Every field is optional on the wire so that missing fields can be
//! reported together instead of failing at the first one.

use crate::core::ids::{GroupId, ParticipantId};
use crate::tracker::TrackerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub name: Option<String>,
}

impl NewUser {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGroup {
    pub name: Option<String>,
    pub user_ids: Option<Vec<ParticipantId>>,
}

impl NewGroup {
    pub fn new(name: impl Into<String>, user_ids: impl IntoIterator<Item = u64>) -> Self {
        Self {
            name: Some(name.into()),
            user_ids: Some(user_ids.into_iter().map(ParticipantId::new).collect()),
        }
    }
}

/// Policy parameters attached to an expense.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitDetails {
    /// Subset of the group sharing an EQUAL split.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<ParticipantId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amounts: Option<BTreeMap<ParticipantId, Decimal>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentages: Option<BTreeMap<ParticipantId, Decimal>>,
}

/// Request to record an expense.
///
/// ```
/// use split_ledger::request::NewExpense;
///
/// let json = r#"{
///     "description": "Dinner",
///     "amount": 90,
///     "paidBy": 1,
///     "groupId": 1,
///     "splitType": "EQUAL"
/// }"#;
/// let request: NewExpense = serde_json::from_str(json).unwrap();
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub paid_by: Option<ParticipantId>,
    pub group_id: Option<GroupId>,
    pub split_type: Option<String>,
    #[serde(default)]
    pub split_details: SplitDetails,
}

/// A [`NewExpense`] with every required field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidExpense {
    pub description: String,
    pub amount: Decimal,
    pub paid_by: ParticipantId,
    pub group_id: GroupId,
    pub split_type: String,
    pub split_details: SplitDetails,
}

impl NewExpense {
    pub fn new(
        description: impl Into<String>,
        amount: Decimal,
        paid_by: u64,
        group_id: u64,
        split_type: impl Into<String>,
    ) -> Self {
        Self {
            description: Some(description.into()),
            amount: Some(amount),
            paid_by: Some(ParticipantId::new(paid_by)),
            group_id: Some(GroupId::new(group_id)),
            split_type: Some(split_type.into()),
            split_details: SplitDetails::default(),
        }
    }

    pub fn with_participants(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.split_details.participants = Some(ids.into_iter().map(ParticipantId::new).collect());
        self
    }

    pub fn with_amounts(mut self, amounts: impl IntoIterator<Item = (u64, Decimal)>) -> Self {
        self.split_details.amounts = Some(
            amounts
                .into_iter()
                .map(|(id, a)| (ParticipantId::new(id), a))
                .collect(),
        );
        self
    }

    pub fn with_percentages(mut self, pcts: impl IntoIterator<Item = (u64, Decimal)>) -> Self {
        self.split_details.percentages = Some(
            pcts.into_iter()
                .map(|(id, p)| (ParticipantId::new(id), p))
                .collect(),
        );
        self
    }

    /// Check that every required field is present and the amount is positive.
    pub fn validate(self) -> Result<ValidExpense, TrackerError> {
        let mut missing = Vec::new();
        if self.description.as_deref().map_or(true, str::is_empty) {
            missing.push("description");
        }
        if self.amount.is_none() {
            missing.push("amount");
        }
        if self.paid_by.is_none() {
            missing.push("paidBy");
        }
        if self.group_id.is_none() {
            missing.push("groupId");
        }
        if self.split_type.as_deref().map_or(true, str::is_empty) {
            missing.push("splitType");
        }

        match (
            self.description,
            self.amount,
            self.paid_by,
            self.group_id,
            self.split_type,
        ) {
            (Some(description), Some(amount), Some(paid_by), Some(group_id), Some(split_type))
                if missing.is_empty() =>
            {
                if amount <= Decimal::ZERO {
                    return Err(TrackerError::InvalidInput(format!(
                        "amount must be positive, got {}",
                        amount
                    )));
                }
                Ok(ValidExpense {
                    description,
                    amount,
                    paid_by,
                    group_id,
                    split_type,
                    split_details: self.split_details,
                })
            }
            _ => Err(TrackerError::MissingFields(missing)),
        }
    }
}
