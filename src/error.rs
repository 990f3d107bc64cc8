//! Error classification shared by the task and user repositories.
//!
//! Each repository keeps its own error enum; [`ErrorKind`] lets callers react
//! to the category of a failure without matching on every variant.

use std::fmt;

/// Category of a repository failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input was rejected by domain validation or a storage constraint.
    Validation,
    /// No record matched the requested identifier or name.
    NotFound,
    /// A persisted record could not be reconstructed into a domain value.
    DataIntegrity,
    /// A concurrent transaction prevented the operation from committing.
    Conflict,
    /// The operation context was cancelled or its deadline passed.
    Cancelled,
    /// The underlying store failed.
    Storage,
}

impl ErrorKind {
    /// Returns a stable lowercase label, suitable for log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::DataIntegrity => "data_integrity",
            Self::Conflict => "conflict",
            Self::Cancelled => "cancelled",
            Self::Storage => "storage",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
