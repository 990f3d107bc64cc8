//! Labels owned by a task.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum label length, matching the `VARCHAR(15)` column.
const MAX_LABEL_LENGTH: usize = 15;

/// Short, trimmed, non-empty label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    /// Creates a validated label.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyLabel`] when the value is empty after
    /// trimming or [`TaskDomainError::LabelTooLong`] when it exceeds 15
    /// characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim();

        if normalized.is_empty() {
            return Err(TaskDomainError::EmptyLabel);
        }
        if normalized.chars().count() > MAX_LABEL_LENGTH {
            return Err(TaskDomainError::LabelTooLong {
                label: raw,
                max: MAX_LABEL_LENGTH,
            });
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Label {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered collection of distinct labels belonging to one task.
///
/// The set is always replaced as a whole; there is no per-label update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(Vec<Label>);

impl LabelSet {
    /// Creates an empty label set.
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    /// Validates each label and rejects duplicates.
    ///
    /// # Errors
    ///
    /// Returns the first label validation failure, or
    /// [`TaskDomainError::DuplicateLabel`] when two values normalize to the
    /// same label.
    pub fn new<I, S>(values: I) -> Result<Self, TaskDomainError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels: Vec<Label> = Vec::new();
        for value in values {
            let label = Label::new(value)?;
            if labels.contains(&label) {
                return Err(TaskDomainError::DuplicateLabel(label.0));
            }
            labels.push(label);
        }
        Ok(Self(labels))
    }

    /// Returns the label names in their stored order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(Label::as_str).collect()
    }

    /// Returns the number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when the set holds no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the labels in their stored order.
    pub fn iter(&self) -> std::slice::Iter<'_, Label> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a LabelSet {
    type Item = &'a Label;
    type IntoIter = std::slice::Iter<'a, Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
