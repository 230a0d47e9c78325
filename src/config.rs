//! Tracker configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::core::amount::DISPLAY_DECIMALS;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Knobs for an [`ExpenseTracker`](crate::tracker::ExpenseTracker).
///
/// Every field has a default, so a config file only needs the keys it
/// changes.
///
/// ```
/// use split_ledger::config::TrackerConfig;
///
/// let config = TrackerConfig::from_json(r#"{ "require_group_members": true }"#).unwrap();
/// assert!(config.require_group_members);
/// assert_eq!(config.display_decimals, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Decimal places balances are rounded to when queried.
    pub display_decimals: u32,
    /// Reject expenses whose payer or share holders are not group members.
    pub require_group_members: bool,
    /// Keep applying a scenario after a rejected request.
    pub continue_on_error: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            display_decimals: DISPLAY_DECIMALS,
            require_group_members: false,
            continue_on_error: false,
        }
    }
}

impl TrackerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(TrackerConfig::from_json("{}").unwrap(), TrackerConfig::default());
    }

    #[test]
    fn test_bad_config_rejected() {
        assert!(matches!(
            TrackerConfig::from_json(r#"{ "display_decimals": "two" }"#),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            TrackerConfig::load("/definitely/not/here.json"),
            Err(ConfigError::Io { .. })
        ));
    }
}
