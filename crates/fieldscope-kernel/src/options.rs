//! Formatting options.

use crate::error::FormatError;
use serde::{Deserialize, Serialize};

/// Text substituted for a field whose value cannot be read.
pub const DEFAULT_SENTINEL: &str = "<unreadable>";

/// What to print for a field that passed the filter but could not be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnreadablePolicy {
    /// Print [`FormatOptions::sentinel`] in place of the value.
    #[default]
    Sentinel,

    /// Print `null`, as if the field held no value.
    Null,
}

/// Knobs for a [`Formatter`](crate::formatter::Formatter).
///
/// Every option has a default, so an empty JSON object is a valid options
/// document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    pub unreadable: UnreadablePolicy,
    pub sentinel: String,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            unreadable: UnreadablePolicy::default(),
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }
}

impl FormatOptions {
    /// Parse options from a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self, FormatError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Text printed for an unreadable field under these options.
    pub fn unreadable_text(&self) -> &str {
        match self.unreadable {
            UnreadablePolicy::Sentinel => &self.sentinel,
            UnreadablePolicy::Null => crate::assemble::NULL_TEXT,
        }
    }
}
