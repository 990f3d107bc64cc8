//! `PostgreSQL` repository implementation for user storage.

use super::{
    models::{NewUserRow, UserChangeset, UserRow},
    schema::users,
};
use crate::context::OperationContext;
use crate::storage::PgStore;
use crate::user::{
    domain::{
        CreateUserCommand, PasswordHash, PersistedUserData, User, UserId, UserName,
        UserUpdateData,
    },
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use mockable::Clock;
use std::sync::Arc;
use tracing::{debug, warn};

const CREATE: &str = "create_user";
const GET_BY_ID: &str = "get_user_by_id";
const GET_BY_NAME: &str = "get_user_by_name";
const UPDATE_BY_ID: &str = "update_user_by_id";
const DELETE_BY_ID: &str = "delete_user_by_id";

const NAME_UNIQUE_CONSTRAINT: &str = "idx_users_name_unique";

/// `PostgreSQL`-backed user repository.
pub struct PostgresUserRepository<C> {
    store: PgStore,
    clock: Arc<C>,
}

impl<C> Clone for PostgresUserRepository<C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C> PostgresUserRepository<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a repository over `store`, stamping creation times from
    /// `clock`.
    #[must_use]
    pub const fn new(store: PgStore, clock: Arc<C>) -> Self {
        Self { store, clock }
    }
}

#[async_trait]
impl<C> UserRepository for PostgresUserRepository<C>
where
    C: Clock + Send + Sync,
{
    async fn create(
        &self,
        ctx: &OperationContext,
        command: CreateUserCommand,
    ) -> UserRepositoryResult<User> {
        debug!(user_name = %command.name, "creating user");
        let new_row = NewUserRow {
            name: command.name.as_str().to_owned(),
            password_hash: command.password_hash.as_str().to_owned(),
            created_at: self.clock.utc(),
        };

        let user = self
            .store
            .run_in_transaction(ctx, CREATE, move |tx| -> UserRepositoryResult<User> {
                let row = diesel::insert_into(users::table)
                    .values(&new_row)
                    .returning(UserRow::as_returning())
                    .get_result::<UserRow>(tx)
                    .map_err(|err| map_write_error(CREATE, err, &command.name))?;
                Ok(User::from_persisted(PersistedUserData {
                    id: UserId::from_raw(row.id),
                    name: command.name,
                    password_hash: command.password_hash,
                    created_at: row.created_at,
                }))
            })
            .await?;
        debug!(user_id = %user.id(), "user created");
        Ok(user)
    }

    async fn get_by_id(&self, ctx: &OperationContext, id: UserId) -> UserRepositoryResult<User> {
        self.store
            .run_read_only(ctx, GET_BY_ID, move |connection| {
                users::table
                    .find(id.into_inner())
                    .select(UserRow::as_select())
                    .get_result::<UserRow>(connection)
                    .optional()
                    .map_err(|err| map_diesel_error(GET_BY_ID, err))?
                    .ok_or(UserRepositoryError::NotFound(id))
                    .and_then(row_to_user)
            })
            .await
            .map_err(|err| UserRepositoryError::for_user(err, id))
    }

    async fn get_by_name(
        &self,
        ctx: &OperationContext,
        name: &UserName,
    ) -> UserRepositoryResult<User> {
        let lookup_name = name.clone();
        self.store
            .run_read_only(ctx, GET_BY_NAME, move |connection| {
                users::table
                    .filter(users::name.eq(lookup_name.as_str()))
                    .select(UserRow::as_select())
                    .first::<UserRow>(connection)
                    .optional()
                    .map_err(|err| map_diesel_error(GET_BY_NAME, err))?
                    .ok_or(UserRepositoryError::NotFoundByName(lookup_name))
                    .and_then(row_to_user)
            })
            .await
    }

    async fn update_by_id(
        &self,
        ctx: &OperationContext,
        id: UserId,
        update: UserUpdateData,
    ) -> UserRepositoryResult<User> {
        debug!(user_id = %id, "updating user");
        self.store
            .run_in_transaction(ctx, UPDATE_BY_ID, move |tx| {
                let mut current = users::table
                    .find(id.into_inner())
                    .select(UserRow::as_select())
                    .for_update()
                    .get_result::<UserRow>(tx)
                    .optional()
                    .map_err(|err| map_diesel_error(UPDATE_BY_ID, err))?
                    .ok_or(UserRepositoryError::NotFound(id))?;
                if update.is_empty() {
                    return row_to_user(current);
                }

                if let Some(name) = update.name() {
                    current.name = name.as_str().to_owned();
                }
                if let Some(password_hash) = update.password_hash() {
                    current.password_hash = password_hash.as_str().to_owned();
                }

                let changes = UserChangeset {
                    name: current.name.clone(),
                    password_hash: current.password_hash.clone(),
                };
                let written = diesel::update(&current)
                    .set(&changes)
                    .returning(UserRow::as_returning())
                    .get_result::<UserRow>(tx)
                    .map_err(|err| match update.name() {
                        Some(name) => map_write_error(UPDATE_BY_ID, err, name),
                        None => map_diesel_error(UPDATE_BY_ID, err),
                    })?;
                row_to_user(written)
            })
            .await
            .map_err(|err| UserRepositoryError::for_user(err, id))
    }

    async fn delete_by_id(&self, ctx: &OperationContext, id: UserId) -> UserRepositoryResult<()> {
        self.store
            .run_in_transaction(ctx, DELETE_BY_ID, move |tx| -> UserRepositoryResult<()> {
                let deleted = diesel::delete(users::table.find(id.into_inner()))
                    .execute(tx)
                    .map_err(|err| map_diesel_error(DELETE_BY_ID, err))?;
                debug!(user_id = %id, deleted, "user delete executed");
                Ok(())
            })
            .await
            .map_err(|err| UserRepositoryError::for_user(err, id))
    }
}

fn row_to_user(row: UserRow) -> UserRepositoryResult<User> {
    let UserRow {
        id,
        name,
        password_hash,
        created_at,
    } = row;
    let user_id = UserId::from_raw(id);

    let parsed_name = UserName::new(name).map_err(|err| integrity_error(user_id, err))?;
    let parsed_hash =
        PasswordHash::new(password_hash).map_err(|err| integrity_error(user_id, err))?;

    Ok(User::from_persisted(PersistedUserData {
        id: user_id,
        name: parsed_name,
        password_hash: parsed_hash,
        created_at,
    }))
}

fn integrity_error(
    user_id: UserId,
    err: impl std::error::Error + Send + Sync + 'static,
) -> UserRepositoryError {
    warn!(user_id = %user_id, error = %err, "stored user failed to load");
    UserRepositoryError::invalid_persisted_data(user_id, err)
}

fn map_write_error(
    operation: &'static str,
    err: DieselError,
    user_name: &UserName,
) -> UserRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if info
                .constraint_name()
                .is_some_and(|name| name == NAME_UNIQUE_CONSTRAINT) =>
        {
            UserRepositoryError::DuplicateName(user_name.clone())
        }
        DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, ref info) => {
            UserRepositoryError::ConstraintViolation {
                operation,
                detail: info.message().to_owned(),
            }
        }
        other => map_diesel_error(operation, other),
    }
}

fn map_diesel_error(operation: &'static str, err: DieselError) -> UserRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, _) => {
            UserRepositoryError::Conflict { operation }
        }
        other => UserRepositoryError::persistence(operation, other),
    }
}
