//! Repository port for user persistence and lookup.

use crate::context::{ContextError, OperationContext};
use crate::error::ErrorKind;
use crate::storage::StoreError;
use crate::user::domain::{CreateUserCommand, User, UserDomainError, UserId, UserName, UserUpdateData};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for user repository operations.
pub type UserRepositoryResult<T> = Result<T, UserRepositoryError>;

/// User persistence contract.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user, stamping its creation time, and returns it with its
    /// assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::DuplicateName`] when the name is taken
    /// or [`UserRepositoryError::ConstraintViolation`] when storage rejects
    /// the row.
    async fn create(
        &self,
        ctx: &OperationContext,
        command: CreateUserCommand,
    ) -> UserRepositoryResult<User>;

    /// Finds a user by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::NotFound`] when no user has the id.
    async fn get_by_id(&self, ctx: &OperationContext, id: UserId) -> UserRepositoryResult<User>;

    /// Finds a user by unique name.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::NotFoundByName`] when no user has the
    /// name.
    async fn get_by_name(
        &self,
        ctx: &OperationContext,
        name: &UserName,
    ) -> UserRepositoryResult<User>;

    /// Overwrites the supplied fields of a user in one transaction and
    /// returns the updated user.
    ///
    /// # Errors
    ///
    /// Returns [`UserRepositoryError::NotFound`] when the user does not
    /// exist and [`UserRepositoryError::DuplicateName`] when the new name is
    /// taken.
    async fn update_by_id(
        &self,
        ctx: &OperationContext,
        id: UserId,
        update: UserUpdateData,
    ) -> UserRepositoryResult<User>;

    /// Deletes a user. Deleting an id that does not exist succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error only when storage fails.
    async fn delete_by_id(&self, ctx: &OperationContext, id: UserId) -> UserRepositoryResult<()>;
}

/// Errors returned by user repository implementations.
#[derive(Debug, Clone, Error)]
pub enum UserRepositoryError {
    /// A value failed domain validation.
    #[error(transparent)]
    Domain(#[from] UserDomainError),

    /// Another user already has this name.
    #[error("duplicate user name: {0}")]
    DuplicateName(UserName),

    /// Storage rejected a row through a check constraint.
    #[error("{operation}: constraint violated: {detail}")]
    ConstraintViolation {
        /// Repository operation that wrote the row.
        operation: &'static str,
        /// Database-provided description of the violation.
        detail: String,
    },

    /// No user has the identifier.
    #[error("user not found: {0}")]
    NotFound(UserId),

    /// No user has the name.
    #[error("user not found by name: {0}")]
    NotFoundByName(UserName),

    /// A stored user could not be reconstructed into a domain value.
    #[error("invalid persisted data for user {user_id}: {source}")]
    InvalidPersistedData {
        /// User whose row is corrupt.
        user_id: UserId,
        /// Validation failure.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// A concurrent transaction prevented the commit.
    #[error("{operation}: conflicting concurrent transaction")]
    Conflict {
        /// Repository operation that lost the conflict.
        operation: &'static str,
    },

    /// The operation context was cancelled or expired.
    #[error(transparent)]
    Interrupted(#[from] ContextError),

    /// Persistence-layer failure.
    #[error("persistence error during {operation}{}: {source}", user_suffix(.user_id.as_ref()))]
    Persistence {
        /// Repository operation that failed.
        operation: &'static str,
        /// User the operation targeted, when it names one.
        user_id: Option<UserId>,
        /// Underlying failure.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl UserRepositoryError {
    /// Wraps a persistence error raised during `operation`.
    pub fn persistence(
        operation: &'static str,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Persistence {
            operation,
            user_id: None,
            source: Arc::new(err),
        }
    }

    /// Attaches `user_id` to a persistence failure that does not name a
    /// user yet. Other variants are returned unchanged.
    #[must_use]
    pub fn for_user(self, user_id: UserId) -> Self {
        match self {
            Self::Persistence {
                operation,
                user_id: None,
                source,
            } => Self::Persistence {
                operation,
                user_id: Some(user_id),
                source,
            },
            other => other,
        }
    }

    /// Wraps a data-quality failure found while loading `user_id`.
    pub fn invalid_persisted_data(
        user_id: UserId,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InvalidPersistedData {
            user_id,
            source: Arc::new(err),
        }
    }

    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_) | Self::DuplicateName(_) | Self::ConstraintViolation { .. } => {
                ErrorKind::Validation
            }
            Self::NotFound(_) | Self::NotFoundByName(_) => ErrorKind::NotFound,
            Self::InvalidPersistedData { .. } => ErrorKind::DataIntegrity,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Interrupted(_) => ErrorKind::Cancelled,
            Self::Persistence { .. } => ErrorKind::Storage,
        }
    }
}

impl From<StoreError> for UserRepositoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Interrupted(reason) => Self::Interrupted(reason),
            other if other.is_serialization_failure() => Self::Conflict {
                operation: other.operation().unwrap_or("user store"),
            },
            other => Self::persistence(other.operation().unwrap_or("user store"), other),
        }
    }
}

fn user_suffix(user_id: Option<&UserId>) -> String {
    user_id.map_or_else(String::new, |id| format!(" for user {id}"))
}
