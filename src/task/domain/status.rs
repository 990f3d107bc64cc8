//! Task priority status.

use super::InvalidStatus;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Priority of a task.
///
/// Persisted as the lowercase tag returned by [`Status::as_str`]. Parsing is
/// exact: no trimming and no case folding, so a stored value that differs
/// from a canonical tag in any way is reported rather than repaired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Needs attention first.
    High,
    /// Normal priority.
    Moderate,
    /// Can wait.
    Low,
}

impl Status {
    /// Every status, highest priority first.
    pub const ALL: [Self; 3] = [Self::High, Self::Moderate, Self::Low];

    /// Parses a canonical status tag.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidStatus`] for anything other than `"high"`,
    /// `"moderate"` or `"low"`.
    pub fn parse(value: &str) -> Result<Self, InvalidStatus> {
        match value {
            "high" => Ok(Self::High),
            "moderate" => Ok(Self::Moderate),
            "low" => Ok(Self::Low),
            _ => Err(InvalidStatus(value.to_owned())),
        }
    }

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Moderate => "moderate",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Status {
    type Error = InvalidStatus;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}
