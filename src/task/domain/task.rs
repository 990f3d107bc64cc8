//! Task aggregate root and the commands that create and replace it.

use super::{LabelSet, Status, TaskDescription, TaskId, TaskName};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Task aggregate root.
///
/// A task owns its status and its label set; both are loaded and replaced
/// together with the task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    name: TaskName,
    description: TaskDescription,
    status: Status,
    labels: LabelSet,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted name.
    pub name: TaskName,
    /// Persisted description.
    pub description: TaskDescription,
    /// Status parsed from its persisted tag.
    pub status: Status,
    /// Persisted labels in storage order.
    pub labels: LabelSet,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            description: data.description,
            status: data.status,
            labels: data.labels,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task name.
    #[must_use]
    pub const fn name(&self) -> &TaskName {
        &self.name
    }

    /// Returns the task description.
    #[must_use]
    pub const fn description(&self) -> &TaskDescription {
        &self.description
    }

    /// Returns the task status.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Returns the labels owned by the task.
    #[must_use]
    pub const fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Everything needed to create a task.
///
/// The creation timestamp is taken from the clock when the command is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskCommand {
    name: TaskName,
    description: TaskDescription,
    status: Status,
    labels: LabelSet,
    created_at: DateTime<Utc>,
}

impl CreateTaskCommand {
    /// Creates a command stamped with the clock's current time.
    #[must_use]
    pub fn new(
        name: TaskName,
        description: TaskDescription,
        status: Status,
        labels: LabelSet,
        clock: &impl Clock,
    ) -> Self {
        Self {
            name,
            description,
            status,
            labels,
            created_at: clock.utc(),
        }
    }

    /// Returns the requested name.
    #[must_use]
    pub const fn name(&self) -> &TaskName {
        &self.name
    }

    /// Returns the requested description.
    #[must_use]
    pub const fn description(&self) -> &TaskDescription {
        &self.description
    }

    /// Returns the requested status.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Returns the requested labels.
    #[must_use]
    pub const fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Full replacement state for an existing task.
///
/// Every field is written; the label set replaces the stored one as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUpdateData {
    /// New name.
    pub name: TaskName,
    /// New description.
    pub description: TaskDescription,
    /// New status.
    pub status: Status,
    /// New label set.
    pub labels: LabelSet,
}
