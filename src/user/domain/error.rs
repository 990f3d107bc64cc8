//! Error types for user domain validation.

use thiserror::Error;

/// Errors returned while constructing domain user values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserDomainError {
    /// The user name is shorter than the minimum after trimming.
    #[error("user name '{name}' is shorter than {min} characters")]
    NameTooShort {
        /// Rejected name.
        name: String,
        /// Minimum accepted length in characters.
        min: usize,
    },

    /// The user name exceeds the storage limit.
    #[error("user name exceeds {max} characters")]
    NameTooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },

    /// The password hash is shorter than the minimum.
    #[error("password hash is shorter than {min} characters")]
    PasswordHashTooShort {
        /// Minimum accepted length in characters.
        min: usize,
    },
}
