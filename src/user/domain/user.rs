//! User aggregate and the commands that create and modify it.

use super::{PasswordHash, UserId, UserName};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    name: UserName,
    password_hash: PasswordHash,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUserData {
    /// Persisted user identifier.
    pub id: UserId,
    /// Persisted name.
    pub name: UserName,
    /// Persisted password hash.
    pub password_hash: PasswordHash,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Reconstructs a user from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUserData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            password_hash: data.password_hash,
            created_at: data.created_at,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the user name.
    #[must_use]
    pub const fn name(&self) -> &UserName {
        &self.name
    }

    /// Returns the stored password hash.
    #[must_use]
    pub const fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Everything needed to create a user.
///
/// The creation timestamp is stamped by the repository at the moment of the
/// call, not supplied here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserCommand {
    /// Requested name.
    pub name: UserName,
    /// Already-hashed password.
    pub password_hash: PasswordHash,
}

/// Fields to overwrite on an existing user.
///
/// A field left as `None` keeps its stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdateData {
    name: Option<UserName>,
    password_hash: Option<PasswordHash>,
}

impl UserUpdateData {
    /// Creates an update that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a replacement name.
    #[must_use]
    pub fn with_name(mut self, name: UserName) -> Self {
        self.name = Some(name);
        self
    }

    /// Sets a replacement password hash.
    #[must_use]
    pub fn with_password_hash(mut self, password_hash: PasswordHash) -> Self {
        self.password_hash = Some(password_hash);
        self
    }

    /// Returns the replacement name, if any.
    #[must_use]
    pub const fn name(&self) -> Option<&UserName> {
        self.name.as_ref()
    }

    /// Returns the replacement password hash, if any.
    #[must_use]
    pub const fn password_hash(&self) -> Option<&PasswordHash> {
        self.password_hash.as_ref()
    }

    /// Returns `true` when the update changes no field.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.password_hash.is_none()
    }
}
