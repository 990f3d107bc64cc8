//! Repository port for task persistence.

use crate::context::{ContextError, OperationContext};
use crate::error::ErrorKind;
use crate::storage::StoreError;
use crate::task::domain::{CreateTaskCommand, Task, TaskDomainError, TaskId, TaskName, TaskUpdateData};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task with its status and labels and returns it with its
    /// assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateName`] when another task has
    /// the same name, [`TaskRepositoryError::DuplicateLabel`] or
    /// [`TaskRepositoryError::ConstraintViolation`] when storage rejects the
    /// rows. Nothing is persisted on failure.
    async fn create(
        &self,
        ctx: &OperationContext,
        command: CreateTaskCommand,
    ) -> TaskRepositoryResult<Task>;

    /// Loads a task with its status and labels.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when no task has the id and
    /// [`TaskRepositoryError::InvalidPersistedData`] when the stored status
    /// cannot be parsed.
    async fn get_by_id(&self, ctx: &OperationContext, id: TaskId) -> TaskRepositoryResult<Task>;

    /// Loads every task, ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::InvalidPersistedData`] if any single
    /// task cannot be reconstructed.
    async fn get_all(&self, ctx: &OperationContext) -> TaskRepositoryResult<Vec<Task>>;

    /// Replaces name, description, status and the whole label set of a task
    /// in one transaction, and returns the updated task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not
    /// exist; the store is left unchanged on any failure.
    async fn update_by_id(
        &self,
        ctx: &OperationContext,
        id: TaskId,
        update: TaskUpdateData,
    ) -> TaskRepositoryResult<Task>;

    /// Deletes a task together with its status and labels.
    ///
    /// Deleting an id that does not exist succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error only when storage fails.
    async fn delete_by_id(&self, ctx: &OperationContext, id: TaskId) -> TaskRepositoryResult<()>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A value failed domain validation.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// Another task already has this name.
    #[error("duplicate task name: {0}")]
    DuplicateName(TaskName),

    /// Storage rejected the task's labels as not unique.
    #[error("duplicate label for task: {0}")]
    DuplicateLabel(TaskName),

    /// Storage rejected a row through a check constraint.
    #[error("{operation}: constraint violated: {detail}")]
    ConstraintViolation {
        /// Repository operation that wrote the row.
        operation: &'static str,
        /// Database-provided description of the violation.
        detail: String,
    },

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// A stored task could not be reconstructed into a domain value.
    #[error("invalid persisted data for task {task_id}: {source}")]
    InvalidPersistedData {
        /// Task whose rows are corrupt.
        task_id: TaskId,
        /// Parse or validation failure.
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
    #[error("persistence error during {operation}{}: {source}", task_suffix(.task_id.as_ref()))]
    Persistence {
        /// Repository operation that failed.
        operation: &'static str,
        /// Task the operation targeted, when it names one.
        task_id: Option<TaskId>,
        /// Underlying failure.
        source: Arc<dyn std::error::Error + Send + Sync>,
    },
}

impl TaskRepositoryError {
    /// Wraps a persistence error raised during `operation`.
    pub fn persistence(
        operation: &'static str,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Persistence {
            operation,
            task_id: None,
            source: Arc::new(err),
        }
    }

    /// Attaches `task_id` to a persistence failure that does not name a
    /// task yet. Other variants are returned unchanged.
    #[must_use]
    pub fn for_task(self, task_id: TaskId) -> Self {
        match self {
            Self::Persistence {
                operation,
                task_id: None,
                source,
            } => Self::Persistence {
                operation,
                task_id: Some(task_id),
                source,
            },
            other => other,
        }
    }

    /// Wraps a data-quality failure found while loading `task_id`.
    pub fn invalid_persisted_data(
        task_id: TaskId,
        err: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InvalidPersistedData {
            task_id,
            source: Arc::new(err),
        }
    }

    /// Returns the category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(_)
            | Self::DuplicateName(_)
            | Self::DuplicateLabel(_)
            | Self::ConstraintViolation { .. } => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidPersistedData { .. } => ErrorKind::DataIntegrity,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Interrupted(_) => ErrorKind::Cancelled,
            Self::Persistence { .. } => ErrorKind::Storage,
        }
    }
}

impl From<StoreError> for TaskRepositoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Interrupted(reason) => Self::Interrupted(reason),
            other if other.is_serialization_failure() => Self::Conflict {
                operation: other.operation().unwrap_or("task store"),
            },
            other => Self::persistence(other.operation().unwrap_or("task store"), other),
        }
    }
}

fn task_suffix(task_id: Option<&TaskId>) -> String {
    task_id.map_or_else(String::new, |id| format!(" for task {id}"))
}
