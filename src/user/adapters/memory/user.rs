//! In-memory repository for users.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::context::OperationContext;
use crate::storage::InMemoryStore;
use crate::user::{
    domain::{
        CreateUserCommand, PasswordHash, PersistedUserData, User, UserId, UserName,
        UserUpdateData,
    },
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};

const CREATE: &str = "create_user";
const GET_BY_ID: &str = "get_user_by_id";
const GET_BY_NAME: &str = "get_user_by_name";
const UPDATE_BY_ID: &str = "update_user_by_id";
const DELETE_BY_ID: &str = "delete_user_by_id";

/// Thread-safe in-memory user repository.
pub struct InMemoryUserRepository<C> {
    store: InMemoryStore<UserTable>,
    clock: Arc<C>,
}

impl<C> Clone for InMemoryUserRepository<C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct UserTable {
    last_id: i64,
    rows: BTreeMap<i64, UserRecord>,
}

#[derive(Debug, Clone)]
struct UserRecord {
    name: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl UserTable {
    fn id_for_name(&self, name: &str) -> Option<i64> {
        self.rows
            .iter()
            .find(|(_, record)| record.name == name)
            .map(|(id, _)| *id)
    }
}

impl<C> InMemoryUserRepository<C>
where
    C: Clock + Send + Sync,
{
    /// Creates an empty repository, stamping creation times from `clock`.
    #[must_use]
    pub fn new(clock: Arc<C>) -> Self {
        Self {
            store: InMemoryStore::default(),
            clock,
        }
    }
}

fn record_to_user(id: i64, record: &UserRecord) -> UserRepositoryResult<User> {
    let user_id = UserId::from_raw(id);
    let name = UserName::new(record.name.as_str()).map_err(|err| integrity_error(user_id, err))?;
    let password_hash = PasswordHash::new(record.password_hash.as_str())
        .map_err(|err| integrity_error(user_id, err))?;

    Ok(User::from_persisted(PersistedUserData {
        id: user_id,
        name,
        password_hash,
        created_at: record.created_at,
    }))
}

fn integrity_error(
    user_id: UserId,
    err: impl std::error::Error + Send + Sync + 'static,
) -> UserRepositoryError {
    warn!(user_id = %user_id, error = %err, "stored user failed to load");
    UserRepositoryError::invalid_persisted_data(user_id, err)
}

#[async_trait]
impl<C> UserRepository for InMemoryUserRepository<C>
where
    C: Clock + Send + Sync,
{
    async fn create(
        &self,
        ctx: &OperationContext,
        command: CreateUserCommand,
    ) -> UserRepositoryResult<User> {
        debug!(user_name = %command.name, "creating user");
        let created_at = self.clock.utc();
        self.store.run_in_transaction(ctx, CREATE, |table| {
            if table.id_for_name(command.name.as_str()).is_some() {
                return Err(UserRepositoryError::DuplicateName(command.name));
            }

            table.last_id += 1;
            let id = table.last_id;
            table.rows.insert(
                id,
                UserRecord {
                    name: command.name.as_str().to_owned(),
                    password_hash: command.password_hash.as_str().to_owned(),
                    created_at,
                },
            );

            Ok(User::from_persisted(PersistedUserData {
                id: UserId::from_raw(id),
                name: command.name,
                password_hash: command.password_hash,
                created_at,
            }))
        })
    }

    async fn get_by_id(&self, ctx: &OperationContext, id: UserId) -> UserRepositoryResult<User> {
        self.store.read(ctx, GET_BY_ID, |table| {
            let record = table
                .rows
                .get(&id.into_inner())
                .ok_or(UserRepositoryError::NotFound(id))?;
            record_to_user(id.into_inner(), record)
        })
    }

    async fn get_by_name(
        &self,
        ctx: &OperationContext,
        name: &UserName,
    ) -> UserRepositoryResult<User> {
        self.store.read(ctx, GET_BY_NAME, |table| {
            let id = table
                .id_for_name(name.as_str())
                .ok_or_else(|| UserRepositoryError::NotFoundByName(name.clone()))?;
            let record = table
                .rows
                .get(&id)
                .ok_or_else(|| UserRepositoryError::NotFoundByName(name.clone()))?;
            record_to_user(id, record)
        })
    }

    async fn update_by_id(
        &self,
        ctx: &OperationContext,
        id: UserId,
        update: UserUpdateData,
    ) -> UserRepositoryResult<User> {
        if update.is_empty() {
            return self.get_by_id(ctx, id).await;
        }
        debug!(user_id = %id, "updating user");
        self.store.run_in_transaction(ctx, UPDATE_BY_ID, |table| {
            let key = id.into_inner();
            let name_owner = update
                .name()
                .and_then(|name| table.id_for_name(name.as_str()));

            let record = table
                .rows
                .get_mut(&key)
                .ok_or(UserRepositoryError::NotFound(id))?;
            if let Some(name) = update.name() {
                if name_owner.is_some_and(|owner| owner != key) {
                    return Err(UserRepositoryError::DuplicateName(name.clone()));
                }
                record.name = name.as_str().to_owned();
            }
            if let Some(password_hash) = update.password_hash() {
                record.password_hash = password_hash.as_str().to_owned();
            }

            record_to_user(key, record)
        })
    }

    async fn delete_by_id(&self, ctx: &OperationContext, id: UserId) -> UserRepositoryResult<()> {
        self.store.run_in_transaction(ctx, DELETE_BY_ID, |table| {
            let deleted = table.rows.remove(&id.into_inner()).is_some();
            debug!(user_id = %id, deleted, "user delete executed");
            Ok(())
        })
    }
}
