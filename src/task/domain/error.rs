//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task name is empty after trimming.
    #[error("task name must not be empty")]
    EmptyName,

    /// The task name exceeds the storage limit.
    #[error("task name exceeds {max} characters: {name}")]
    NameTooLong {
        /// Rejected name.
        name: String,
        /// Maximum accepted length in characters.
        max: usize,
    },

    /// The task description is empty after trimming.
    #[error("task description must not be empty")]
    EmptyDescription,

    /// A label is empty after trimming.
    #[error("task label must not be empty")]
    EmptyLabel,

    /// A label exceeds the storage limit.
    #[error("task label exceeds {max} characters: {label}")]
    LabelTooLong {
        /// Rejected label.
        label: String,
        /// Maximum accepted length in characters.
        max: usize,
    },

    /// The same label appears more than once in one task.
    #[error("duplicate task label: {0}")]
    DuplicateLabel(String),
}

/// Error returned when a string is not one of the known status tags.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid status: {0}")]
pub struct InvalidStatus(pub String);
