//! Diesel row models for task persistence.

use super::schema::{task_labels, task_statuses, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Storage-assigned task identifier.
    pub id: i64,
    /// Unique task name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Unique task name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Columns overwritten by a task update.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
pub struct TaskChangeset {
    /// Replacement name.
    pub name: String,
    /// Replacement description.
    pub description: String,
    /// Update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Status record owned by a task.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = task_statuses)]
#[diesel(primary_key(task_id))]
#[diesel(belongs_to(TaskRow, foreign_key = task_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskStatusRow {
    /// Owning task.
    pub task_id: i64,
    /// Canonical status tag as stored.
    pub status_name: String,
}

/// Insert model for status records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_statuses)]
pub struct NewTaskStatusRow {
    /// Owning task.
    pub task_id: i64,
    /// Canonical status tag.
    pub status_name: String,
}

/// Label record owned by a task.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations)]
#[diesel(table_name = task_labels)]
#[diesel(belongs_to(TaskRow, foreign_key = task_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskLabelRow {
    /// Label row identifier.
    pub id: i64,
    /// Owning task.
    pub task_id: i64,
    /// Label text.
    pub label_name: String,
}

/// Insert model for label records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_labels)]
pub struct NewTaskLabelRow {
    /// Owning task.
    pub task_id: i64,
    /// Label text.
    pub label_name: String,
}
