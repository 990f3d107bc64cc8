//! In-memory repository for tasks.
//!
//! State mirrors the relational layout: task records keyed by id, a status
//! tag per task, and a label arena keyed by owning task id. Status tags go
//! through the same string conversion as the `PostgreSQL` adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::context::OperationContext;
use crate::storage::InMemoryStore;
use crate::task::{
    domain::{
        CreateTaskCommand, LabelSet, PersistedTaskData, Status, Task, TaskDescription, TaskId,
        TaskName, TaskUpdateData,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

const CREATE: &str = "create_task";
const GET_BY_ID: &str = "get_task_by_id";
const GET_ALL: &str = "get_all_tasks";
const UPDATE_BY_ID: &str = "update_task_by_id";
const DELETE_BY_ID: &str = "delete_task_by_id";

/// Thread-safe in-memory task repository.
pub struct InMemoryTaskRepository<C> {
    store: InMemoryStore<TaskTables>,
    clock: Arc<C>,
}

impl<C> Clone for InMemoryTaskRepository<C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct TaskTables {
    last_id: i64,
    tasks: BTreeMap<i64, TaskRecord>,
    statuses: HashMap<i64, String>,
    labels: HashMap<i64, Vec<String>>,
}

#[derive(Debug, Clone)]
struct TaskRecord {
    name: String,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<C> InMemoryTaskRepository<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty repository, stamping update times from `clock`.
    #[must_use]
    pub fn new(clock: Arc<C>) -> Self {
        Self {
            store: InMemoryStore::default(),
            clock,
        }
    }
}

impl TaskTables {
    fn name_taken(&self, name: &TaskName, except: Option<i64>) -> bool {
        self.tasks
            .iter()
            .any(|(id, record)| Some(*id) != except && record.name == name.as_str())
    }

    fn write_children(&mut self, id: i64, status: Status, labels: &LabelSet) {
        self.statuses.insert(id, status.as_str().to_owned());
        self.labels.insert(
            id,
            labels.iter().map(|label| label.as_str().to_owned()).collect(),
        );
    }

    fn load(&self, id: i64, record: &TaskRecord) -> TaskRepositoryResult<Task> {
        let task_id = TaskId::from_raw(id);
        let raw_status = self.statuses.get(&id).map(String::as_str).unwrap_or_default();
        let status = Status::parse(raw_status).map_err(|err| integrity_error(task_id, err))?;
        let name = TaskName::new(record.name.as_str()).map_err(|err| integrity_error(task_id, err))?;
        let description = TaskDescription::new(record.description.as_str())
            .map_err(|err| integrity_error(task_id, err))?;
        let labels = LabelSet::new(self.labels.get(&id).into_iter().flatten().cloned())
            .map_err(|err| integrity_error(task_id, err))?;

        Ok(Task::from_persisted(PersistedTaskData {
            id: task_id,
            name,
            description,
            status,
            labels,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }))
    }
}

fn integrity_error(
    task_id: TaskId,
    err: impl std::error::Error + Send + Sync + 'static,
) -> TaskRepositoryError {
    warn!(task_id = %task_id, error = %err, "stored task failed to load");
    TaskRepositoryError::invalid_persisted_data(task_id, err)
}

#[async_trait]
impl<C> TaskRepository for InMemoryTaskRepository<C>
where
    C: Clock + Send + Sync,
{
    async fn create(
        &self,
        ctx: &OperationContext,
        command: CreateTaskCommand,
    ) -> TaskRepositoryResult<Task> {
        debug!(task_name = %command.name(), "creating task");
        self.store.run_in_transaction(ctx, CREATE, |tables| {
            if tables.name_taken(command.name(), None) {
                return Err(TaskRepositoryError::DuplicateName(command.name().clone()));
            }

            tables.last_id += 1;
            let id = tables.last_id;
            tables.tasks.insert(
                id,
                TaskRecord {
                    name: command.name().as_str().to_owned(),
                    description: command.description().as_str().to_owned(),
                    created_at: command.created_at(),
                    updated_at: command.created_at(),
                },
            );
            tables.write_children(id, command.status(), command.labels());

            Ok(Task::from_persisted(PersistedTaskData {
                id: TaskId::from_raw(id),
                name: command.name().clone(),
                description: command.description().clone(),
                status: command.status(),
                labels: command.labels().clone(),
                created_at: command.created_at(),
                updated_at: command.created_at(),
            }))
        })
    }

    async fn get_by_id(&self, ctx: &OperationContext, id: TaskId) -> TaskRepositoryResult<Task> {
        self.store.read(ctx, GET_BY_ID, |tables| {
            let record = tables
                .tasks
                .get(&id.into_inner())
                .ok_or(TaskRepositoryError::NotFound(id))?;
            tables.load(id.into_inner(), record)
        })
    }

    async fn get_all(&self, ctx: &OperationContext) -> TaskRepositoryResult<Vec<Task>> {
        self.store.read(ctx, GET_ALL, |tables| {
            tables
                .tasks
                .iter()
                .map(|(id, record)| tables.load(*id, record))
                .collect()
        })
    }

    async fn update_by_id(
        &self,
        ctx: &OperationContext,
        id: TaskId,
        update: TaskUpdateData,
    ) -> TaskRepositoryResult<Task> {
        debug!(task_id = %id, "updating task");
        let updated_at = self.clock.utc();
        self.store.run_in_transaction(ctx, UPDATE_BY_ID, |tables| {
            let key = id.into_inner();
            let Some(created_at) = tables.tasks.get(&key).map(|record| record.created_at) else {
                return Err(TaskRepositoryError::NotFound(id));
            };
            if tables.name_taken(&update.name, Some(key)) {
                return Err(TaskRepositoryError::DuplicateName(update.name.clone()));
            }

            tables.tasks.insert(
                key,
                TaskRecord {
                    name: update.name.as_str().to_owned(),
                    description: update.description.as_str().to_owned(),
                    created_at,
                    updated_at,
                },
            );
            tables.write_children(key, update.status, &update.labels);

            Ok(Task::from_persisted(PersistedTaskData {
                id,
                name: update.name,
                description: update.description,
                status: update.status,
                labels: update.labels,
                created_at,
                updated_at,
            }))
        })
    }

    async fn delete_by_id(&self, ctx: &OperationContext, id: TaskId) -> TaskRepositoryResult<()> {
        self.store.run_in_transaction(ctx, DELETE_BY_ID, |tables| {
            let key = id.into_inner();
            let deleted = tables.tasks.remove(&key).is_some();
            tables.statuses.remove(&key);
            tables.labels.remove(&key);
            debug!(task_id = %id, deleted, "task delete executed");
            Ok(())
        })
    }
}
