//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{
        NewTaskLabelRow, NewTaskRow, NewTaskStatusRow, TaskChangeset, TaskLabelRow, TaskRow,
        TaskStatusRow,
    },
    schema::{task_labels, task_statuses, tasks},
};
use crate::context::OperationContext;
use crate::storage::PgStore;
use crate::task::{
    domain::{
        CreateTaskCommand, LabelSet, PersistedTaskData, Status, Task, TaskDescription, TaskId,
        TaskName, TaskUpdateData,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

const CREATE: &str = "create_task";
const GET_BY_ID: &str = "get_task_by_id";
const GET_ALL: &str = "get_all_tasks";
const UPDATE_BY_ID: &str = "update_task_by_id";
const DELETE_BY_ID: &str = "delete_task_by_id";

const NAME_UNIQUE_CONSTRAINT: &str = "idx_tasks_name_unique";
const LABEL_UNIQUE_CONSTRAINT: &str = "idx_task_labels_task_label_unique";

/// `PostgreSQL`-backed task repository.
///
/// A task is stored as one `tasks` row, one `task_statuses` row and zero or
/// more `task_labels` rows. Every write runs in a single transaction.
pub struct PostgresTaskRepository<C> {
    store: PgStore,
    clock: Arc<C>,
}

impl<C> Clone for PostgresTaskRepository<C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C> PostgresTaskRepository<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a repository over `store`, stamping update times from `clock`.
    #[must_use]
    pub const fn new(store: PgStore, clock: Arc<C>) -> Self {
        Self { store, clock }
    }
}

#[derive(Debug, Error)]
#[error("task has no status record")]
struct MissingStatusRecord;

#[async_trait]
impl<C> TaskRepository for PostgresTaskRepository<C>
where
    C: Clock + Send + Sync,
{
    async fn create(
        &self,
        ctx: &OperationContext,
        command: CreateTaskCommand,
    ) -> TaskRepositoryResult<Task> {
        debug!(task_name = %command.name(), "creating task");
        let task = self
            .store
            .run_in_transaction(ctx, CREATE, move |tx| insert_task(tx, &command))
            .await?;
        debug!(task_id = %task.id(), "task created");
        Ok(task)
    }

    async fn get_by_id(&self, ctx: &OperationContext, id: TaskId) -> TaskRepositoryResult<Task> {
        debug!(task_id = %id, "loading task");
        self.store
            .run_read_only(ctx, GET_BY_ID, move |connection| {
                let row = tasks::table
                    .find(id.into_inner())
                    .select(TaskRow::as_select())
                    .get_result::<TaskRow>(connection)
                    .optional()
                    .map_err(|err| map_diesel_error(GET_BY_ID, err))?
                    .ok_or(TaskRepositoryError::NotFound(id))?;
                load_aggregates(connection, GET_BY_ID, vec![row])?
                    .into_iter()
                    .next()
                    .ok_or(TaskRepositoryError::NotFound(id))
            })
            .await
            .map_err(|err| TaskRepositoryError::for_task(err, id))
    }

    async fn get_all(&self, ctx: &OperationContext) -> TaskRepositoryResult<Vec<Task>> {
        debug!("loading all tasks");
        self.store
            .run_read_only(ctx, GET_ALL, move |connection| {
                let rows = tasks::table
                    .select(TaskRow::as_select())
                    .order(tasks::id.asc())
                    .load::<TaskRow>(connection)
                    .map_err(|err| map_diesel_error(GET_ALL, err))?;
                load_aggregates(connection, GET_ALL, rows)
            })
            .await
    }

    async fn update_by_id(
        &self,
        ctx: &OperationContext,
        id: TaskId,
        update: TaskUpdateData,
    ) -> TaskRepositoryResult<Task> {
        debug!(task_id = %id, "updating task");
        let updated_at = self.clock.utc();
        self.store
            .run_in_transaction(ctx, UPDATE_BY_ID, move |tx| {
                let current = tasks::table
                    .find(id.into_inner())
                    .select(TaskRow::as_select())
                    .for_update()
                    .get_result::<TaskRow>(tx)
                    .optional()
                    .map_err(|err| map_diesel_error(UPDATE_BY_ID, err))?
                    .ok_or(TaskRepositoryError::NotFound(id))?;

                let changes = TaskChangeset {
                    name: update.name.as_str().to_owned(),
                    description: update.description.as_str().to_owned(),
                    updated_at,
                };
                let written = diesel::update(&current)
                    .set(&changes)
                    .returning(TaskRow::as_returning())
                    .get_result::<TaskRow>(tx)
                    .map_err(|err| map_write_error(UPDATE_BY_ID, err, &update.name))?;

                // Status and labels are superseded, never diffed.
                diesel::delete(task_statuses::table.filter(task_statuses::task_id.eq(current.id)))
                    .execute(tx)
                    .map_err(|err| map_diesel_error(UPDATE_BY_ID, err))?;
                diesel::delete(task_labels::table.filter(task_labels::task_id.eq(current.id)))
                    .execute(tx)
                    .map_err(|err| map_diesel_error(UPDATE_BY_ID, err))?;
                insert_children(
                    tx,
                    UPDATE_BY_ID,
                    id,
                    update.status,
                    &update.labels,
                    &update.name,
                )?;

                Ok(Task::from_persisted(PersistedTaskData {
                    id,
                    name: update.name,
                    description: update.description,
                    status: update.status,
                    labels: update.labels,
                    created_at: written.created_at,
                    updated_at: written.updated_at,
                }))
            })
            .await
            .map_err(|err| TaskRepositoryError::for_task(err, id))
    }

    async fn delete_by_id(&self, ctx: &OperationContext, id: TaskId) -> TaskRepositoryResult<()> {
        self.store
            .run_in_transaction(ctx, DELETE_BY_ID, move |tx| -> TaskRepositoryResult<()> {
                let deleted = diesel::delete(tasks::table.find(id.into_inner()))
                    .execute(tx)
                    .map_err(|err| map_diesel_error(DELETE_BY_ID, err))?;
                debug!(task_id = %id, deleted, "task delete executed");
                Ok(())
            })
            .await
            .map_err(|err| TaskRepositoryError::for_task(err, id))
    }
}

fn insert_task(tx: &mut PgConnection, command: &CreateTaskCommand) -> TaskRepositoryResult<Task> {
    let new_row = NewTaskRow {
        name: command.name().as_str().to_owned(),
        description: command.description().as_str().to_owned(),
        created_at: command.created_at(),
        updated_at: command.created_at(),
    };
    let row = diesel::insert_into(tasks::table)
        .values(&new_row)
        .returning(TaskRow::as_returning())
        .get_result::<TaskRow>(tx)
        .map_err(|err| map_write_error(CREATE, err, command.name()))?;

    let task_id = TaskId::from_raw(row.id);
    insert_children(
        tx,
        CREATE,
        task_id,
        command.status(),
        command.labels(),
        command.name(),
    )?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: task_id,
        name: command.name().clone(),
        description: command.description().clone(),
        status: command.status(),
        labels: command.labels().clone(),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn insert_children(
    tx: &mut PgConnection,
    operation: &'static str,
    task_id: TaskId,
    status: Status,
    labels: &LabelSet,
    task_name: &TaskName,
) -> TaskRepositoryResult<()> {
    let status_row = NewTaskStatusRow {
        task_id: task_id.into_inner(),
        status_name: status.as_str().to_owned(),
    };
    diesel::insert_into(task_statuses::table)
        .values(&status_row)
        .execute(tx)
        .map_err(|err| map_write_error(operation, err, task_name).for_task(task_id))?;

    let label_rows: Vec<NewTaskLabelRow> = labels
        .iter()
        .map(|label| NewTaskLabelRow {
            task_id: task_id.into_inner(),
            label_name: label.as_str().to_owned(),
        })
        .collect();
    if !label_rows.is_empty() {
        diesel::insert_into(task_labels::table)
            .values(&label_rows)
            .execute(tx)
            .map_err(|err| map_write_error(operation, err, task_name).for_task(task_id))?;
    }
    Ok(())
}

fn load_aggregates(
    connection: &mut PgConnection,
    operation: &'static str,
    rows: Vec<TaskRow>,
) -> TaskRepositoryResult<Vec<Task>> {
    let statuses = TaskStatusRow::belonging_to(&rows)
        .select(TaskStatusRow::as_select())
        .load::<TaskStatusRow>(connection)
        .map_err(|err| map_diesel_error(operation, err))?;
    let labels = TaskLabelRow::belonging_to(&rows)
        .select(TaskLabelRow::as_select())
        .order(task_labels::id.asc())
        .load::<TaskLabelRow>(connection)
        .map_err(|err| map_diesel_error(operation, err))?;

    let statuses_by_task = statuses.grouped_by(&rows);
    let labels_by_task = labels.grouped_by(&rows);

    rows.into_iter()
        .zip(statuses_by_task)
        .zip(labels_by_task)
        .map(|((row, status_rows), label_rows)| row_to_task(row, status_rows, label_rows))
        .collect()
}

fn row_to_task(
    row: TaskRow,
    status_rows: Vec<TaskStatusRow>,
    label_rows: Vec<TaskLabelRow>,
) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        name,
        description,
        created_at,
        updated_at,
    } = row;
    let task_id = TaskId::from_raw(id);

    let status_row = status_rows
        .into_iter()
        .next()
        .ok_or_else(|| integrity_error(task_id, MissingStatusRecord))?;
    let status =
        Status::parse(&status_row.status_name).map_err(|err| integrity_error(task_id, err))?;
    let parsed_name = TaskName::new(name).map_err(|err| integrity_error(task_id, err))?;
    let parsed_description =
        TaskDescription::new(description).map_err(|err| integrity_error(task_id, err))?;
    let labels = LabelSet::new(label_rows.into_iter().map(|label| label.label_name))
        .map_err(|err| integrity_error(task_id, err))?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: task_id,
        name: parsed_name,
        description: parsed_description,
        status,
        labels,
        created_at,
        updated_at,
    }))
}

fn integrity_error(
    task_id: TaskId,
    err: impl std::error::Error + Send + Sync + 'static,
) -> TaskRepositoryError {
    warn!(task_id = %task_id, error = %err, "stored task failed to load");
    TaskRepositoryError::invalid_persisted_data(task_id, err)
}

fn map_write_error(
    operation: &'static str,
    err: DieselError,
    task_name: &TaskName,
) -> TaskRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if has_constraint(info.as_ref(), NAME_UNIQUE_CONSTRAINT) =>
        {
            TaskRepositoryError::DuplicateName(task_name.clone())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if has_constraint(info.as_ref(), LABEL_UNIQUE_CONSTRAINT) =>
        {
            TaskRepositoryError::DuplicateLabel(task_name.clone())
        }
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, ref info) => {
            TaskRepositoryError::ConstraintViolation {
                operation,
                detail: info.message().to_owned(),
            }
        }
        other => map_diesel_error(operation, other),
    }
}

fn map_diesel_error(operation: &'static str, err: DieselError) -> TaskRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            TaskRepositoryError::Conflict { operation }
        }
        other => TaskRepositoryError::persistence(operation, other),
    }
}

fn has_constraint(info: &dyn DatabaseErrorInformation, constraint: &str) -> bool {
    info.constraint_name().is_some_and(|name| name == constraint)
}
