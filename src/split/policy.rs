use crate::core::ids::ParticipantId;
use crate::split::calculator::SplitError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The tag naming a splitting policy, as it appears on the wire.
///
/// ```
/// use split_ledger::split::policy::SplitKind;
///
/// let kind: SplitKind = "PERCENTAGE".parse().unwrap();
/// assert_eq!(kind, SplitKind::Percentage);
/// assert!("HALVES".parse::<SplitKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitKind {
    Equal,
    Exact,
    Percentage,
}

impl SplitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitKind::Equal => "EQUAL",
            SplitKind::Exact => "EXACT",
            SplitKind::Percentage => "PERCENTAGE",
        }
    }
}

impl fmt::Display for SplitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SplitKind {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EQUAL" => Ok(SplitKind::Equal),
            "EXACT" => Ok(SplitKind::Exact),
            "PERCENTAGE" => Ok(SplitKind::Percentage),
            other => Err(SplitError::InvalidPolicy(other.to_string())),
        }
    }
}

/// A splitting policy together with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "parameters", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitPolicy {
    /// Everyone in the participant set pays the same.
    Equal,
    /// Explicit amount per participant.
    Exact(BTreeMap<ParticipantId, Decimal>),
    /// Percentage of the total per participant.
    Percentage(BTreeMap<ParticipantId, Decimal>),
}

impl SplitPolicy {
    /// Build a policy from a wire tag and whichever parameter map it needs.
    pub fn from_tag(
        tag: &str,
        amounts: Option<BTreeMap<ParticipantId, Decimal>>,
        percentages: Option<BTreeMap<ParticipantId, Decimal>>,
    ) -> Result<Self, SplitError> {
        match tag.parse::<SplitKind>()? {
            SplitKind::Equal => Ok(SplitPolicy::Equal),
            SplitKind::Exact => amounts.map(SplitPolicy::Exact).ok_or_else(|| {
                SplitError::InvalidInput("EXACT split requires amounts".to_string())
            }),
            SplitKind::Percentage => percentages.map(SplitPolicy::Percentage).ok_or_else(|| {
                SplitError::InvalidInput("PERCENTAGE split requires percentages".to_string())
            }),
        }
    }

    pub fn kind(&self) -> SplitKind {
        match self {
            SplitPolicy::Equal => SplitKind::Equal,
            SplitPolicy::Exact(_) => SplitKind::Exact,
            SplitPolicy::Percentage(_) => SplitKind::Percentage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_kind_parsing_is_case_sensitive() {
        assert_eq!("EQUAL".parse::<SplitKind>().unwrap(), SplitKind::Equal);
        assert_eq!("EXACT".parse::<SplitKind>().unwrap(), SplitKind::Exact);
        assert_eq!(
            "equal".parse::<SplitKind>(),
            Err(SplitError::InvalidPolicy("equal".to_string()))
        );
    }

    #[test]
    fn test_from_tag_picks_parameters() {
        let amounts = BTreeMap::from([(ParticipantId::new(2), dec!(10))]);
        let policy = SplitPolicy::from_tag("EXACT", Some(amounts.clone()), None).unwrap();
        assert_eq!(policy, SplitPolicy::Exact(amounts));
        assert_eq!(policy.kind(), SplitKind::Exact);

        assert_eq!(
            SplitPolicy::from_tag("EQUAL", None, None).unwrap(),
            SplitPolicy::Equal
        );
    }

    #[test]
    fn test_from_tag_requires_parameters() {
        assert!(matches!(
            SplitPolicy::from_tag("PERCENTAGE", None, None),
            Err(SplitError::InvalidInput(_))
        ));
        assert!(matches!(
            SplitPolicy::from_tag("SHARES", None, None),
            Err(SplitError::InvalidPolicy(_))
        ));
    }

    #[test]
    fn test_policy_serializes_with_tag() {
        let policy = SplitPolicy::Percentage(BTreeMap::from([(ParticipantId::new(2), dec!(60))]));
        let json = serde_json::to_value(&policy).unwrap();
        assert_eq!(json["kind"], "PERCENTAGE");
        assert_eq!(json["parameters"]["2"], "60");
    }
}
