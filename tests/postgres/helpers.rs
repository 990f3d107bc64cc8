//! Shared test helpers for `PostgreSQL` integration tests.
//!
//! Every test gets a fresh schema on the shared server (see
//! [`super::cluster`]). Pooled connections are pinned to that schema through
//! `search_path`, and the schema is dropped when the [`TestSchema`] guard is
//! dropped.

use super::cluster::shared_server;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection, Pool};
use mockable::DefaultClock;
use rstest::fixture;
use std::io;
use std::sync::Arc;
use todo_store::storage::PgStore;
use todo_store::task::adapters::postgres::PostgresTaskRepository;
use todo_store::user::adapters::postgres::PostgresUserRepository;
use tokio::runtime::Runtime;
use uuid::Uuid;

/// Boxed error type used by fallible helpers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Environment variable naming an external test server.
pub const TEST_DATABASE_URL_ENV: &str = "TODO_STORE_TEST_DATABASE_URL";

/// SQL creating the tables.
pub const CREATE_SCHEMA_SQL: &str =
    include_str!("../../migrations/2026-10-19-000000_create_tasks_and_users/up.sql");

const POOL_MAX_SIZE: u32 = 4;

#[derive(Debug)]
struct SearchPath {
    schema: String,
}

impl CustomizeConnection<PgConnection, r2d2::Error> for SearchPath {
    fn on_acquire(&self, conn: &mut PgConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute(&format!("SET search_path TO {}", quote_identifier(&self.schema)))
            .map_err(r2d2::Error::QueryError)
    }
}

/// A schema created for one test and dropped with the guard.
pub struct TestSchema {
    url: String,
    schema: String,
    store: PgStore,
}

impl TestSchema {
    /// Creates a uniquely named schema, applies the migration to it, and
    /// builds a pool whose connections use it.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable or the migration fails.
    pub fn create(url: &str) -> Result<Self, BoxError> {
        let schema = format!("todo_test_{}", Uuid::new_v4().simple());
        let mut conn = PgConnection::establish(url)?;
        conn.batch_execute(&format!(
            "CREATE SCHEMA {schema}; SET search_path TO {schema};",
            schema = quote_identifier(&schema)
        ))?;
        conn.batch_execute(CREATE_SCHEMA_SQL)?;

        let pool = Pool::builder()
            .max_size(POOL_MAX_SIZE)
            .connection_customizer(Box::new(SearchPath {
                schema: schema.clone(),
            }))
            .build(ConnectionManager::<PgConnection>::new(url))?;

        Ok(Self {
            url: url.to_owned(),
            schema,
            store: PgStore::new(pool),
        })
    }

    /// Returns a store bound to this schema.
    #[must_use]
    pub fn store(&self) -> PgStore {
        self.store.clone()
    }

    /// Builds a task repository bound to this schema.
    #[must_use]
    pub fn task_repo(&self) -> PostgresTaskRepository<DefaultClock> {
        PostgresTaskRepository::new(self.store(), Arc::new(DefaultClock))
    }

    /// Builds a user repository bound to this schema.
    #[must_use]
    pub fn user_repo(&self) -> PostgresUserRepository<DefaultClock> {
        PostgresUserRepository::new(self.store(), Arc::new(DefaultClock))
    }

    /// Executes raw SQL inside this schema.
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be acquired or the SQL fails.
    pub fn execute(&self, sql: &str) -> Result<(), BoxError> {
        let mut conn = self.store.pool().get()?;
        conn.batch_execute(sql)?;
        Ok(())
    }

    /// Counts rows in `table` inside this schema.
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be acquired or the query fails.
    pub fn count_rows(&self, table: &str) -> Result<i64, BoxError> {
        let mut conn = self.store.pool().get()?;
        let row = diesel::sql_query(format!(
            "SELECT COUNT(*) AS count FROM {}",
            quote_identifier(table)
        ))
        .get_result::<CountRow>(&mut conn)?;
        Ok(row.count)
    }

    fn drop_schema(&self) -> Result<(), BoxError> {
        let mut conn = PgConnection::establish(&self.url)?;
        conn.batch_execute(&format!(
            "DROP SCHEMA IF EXISTS {} CASCADE",
            quote_identifier(&self.schema)
        ))?;
        Ok(())
    }
}

impl Drop for TestSchema {
    fn drop(&mut self) {
        drop(self.drop_schema());
    }
}

#[derive(diesel::QueryableByName)]
struct CountRow {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    count: i64,
}

/// Provides a fresh schema on the shared server.
///
/// # Panics
///
/// Panics if no server is available or the schema cannot be prepared.
#[fixture]
pub fn test_schema() -> TestSchema {
    TestSchema::create(shared_server().url()).expect("test schema setup")
}

/// Provides a clock for command creation.
#[fixture]
pub fn clock() -> DefaultClock {
    DefaultClock
}

/// Builds a multi-threaded runtime so blocking database work and concurrent
/// callers can make progress together.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
pub fn test_runtime() -> io::Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
