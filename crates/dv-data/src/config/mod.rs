//! Source construction configuration

use serde::{Deserialize, Serialize};

use crate::DataError;

/// Checks applied when building and validating a column data source
///
/// Every check is off by default, which keeps construction as permissive as
/// plain attribute assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Reject an explicit `column_names` that disagrees with the columns present
    pub validate_column_names: bool,

    /// Require every column to have the same length
    pub validate_lengths: bool,

    /// Require every selected index to address an existing row
    pub validate_selection: bool,
}

impl SourceConfig {
    /// Configuration with every check enabled
    pub fn strict() -> Self {
        Self {
            validate_column_names: true,
            validate_lengths: true,
            validate_selection: true,
        }
    }

    /// Parse a configuration from JSON; missing keys take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        serde_json::from_str(json).map_err(|e| DataError::Config(e.to_string()))
    }

    /// Whether construction needs a validation pass at all
    pub fn validates_rows(&self) -> bool {
        self.validate_lengths || self.validate_selection
    }
}
