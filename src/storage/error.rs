//! Failures raised by the stores themselves, independent of any aggregate.

use crate::context::ContextError;
use diesel::r2d2::PoolError;
use thiserror::Error;

/// Error raised while acquiring, running or committing a unit of work.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No connection could be taken from the pool.
    #[error("{operation}: failed to acquire connection: {source}")]
    Pool {
        /// Repository operation that requested the connection.
        operation: &'static str,
        /// Underlying pool failure.
        #[source]
        source: PoolError,
    },

    /// The blocking task running the unit of work panicked or was aborted.
    #[error("{operation}: blocking task failed: {source}")]
    Join {
        /// Repository operation that spawned the task.
        operation: &'static str,
        /// Underlying join failure.
        #[source]
        source: tokio::task::JoinError,
    },

    /// Beginning or committing the transaction failed.
    #[error("{operation}: transaction failed: {source}")]
    Transaction {
        /// Repository operation that owned the transaction.
        operation: &'static str,
        /// Underlying Diesel failure.
        #[source]
        source: diesel::result::Error,
    },

    /// The in-memory store lock was poisoned by a panicking writer.
    #[error("{operation}: store lock poisoned")]
    Poisoned {
        /// Repository operation that attempted to take the lock.
        operation: &'static str,
    },

    /// The operation context was cancelled or expired.
    #[error(transparent)]
    Interrupted(#[from] ContextError),
}

impl StoreError {
    /// Returns the repository operation the failure belongs to, if recorded.
    #[must_use]
    pub const fn operation(&self) -> Option<&'static str> {
        match self {
            Self::Pool { operation, .. }
            | Self::Join { operation, .. }
            | Self::Transaction { operation, .. }
            | Self::Poisoned { operation } => Some(*operation),
            Self::Interrupted(_) => None,
        }
    }

    /// Returns `true` when the database reported a serialization conflict.
    #[must_use]
    pub const fn is_serialization_failure(&self) -> bool {
        matches!(
            self,
            Self::Transaction {
                source: diesel::result::Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::SerializationFailure,
                    _,
                ),
                ..
            }
        )
    }
}
