//! Validated user name and password hash.

use super::UserDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

const MIN_NAME_LENGTH: usize = 4;

/// Maximum user name length, matching the `VARCHAR(255)` column.
const MAX_NAME_LENGTH: usize = 255;

const MIN_PASSWORD_HASH_LENGTH: usize = 6;

/// Trimmed user name between 4 and 255 characters.
///
/// Uniqueness across users is enforced by storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    /// Creates a validated user name.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::NameTooShort`] when fewer than 4
    /// characters remain after trimming, or [`UserDomainError::NameTooLong`]
    /// when more than 255 do.
    pub fn new(value: impl Into<String>) -> Result<Self, UserDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        let length = normalized.chars().count();

        if length < MIN_NAME_LENGTH {
            return Err(UserDomainError::NameTooShort {
                name: raw,
                min: MIN_NAME_LENGTH,
            });
        }
        if length > MAX_NAME_LENGTH {
            return Err(UserDomainError::NameTooLong {
                max: MAX_NAME_LENGTH,
            });
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pre-computed password hash.
///
/// Hashing happens before a value reaches this type; the hash is stored as
/// given. `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wraps a hash of at least 6 characters.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::PasswordHashTooShort`] for shorter values.
    pub fn new(value: impl Into<String>) -> Result<Self, UserDomainError> {
        let raw = value.into();
        if raw.chars().count() < MIN_PASSWORD_HASH_LENGTH {
            return Err(UserDomainError::PasswordHashTooShort {
                min: MIN_PASSWORD_HASH_LENGTH,
            });
        }
        Ok(Self(raw))
    }

    /// Returns the hash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}
