//! `PostgreSQL` unit-of-work store backed by an `r2d2` connection pool.

use super::StoreError;
use crate::context::OperationContext;
use diesel::connection::Connection;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use tracing::warn;

/// `PostgreSQL` connection pool type used by the repository adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Transactional access to a `PostgreSQL` database.
///
/// Diesel is synchronous, so every unit of work is moved onto
/// [`tokio::task::spawn_blocking`] to keep async executor threads free.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(Debug, Clone, Copy)]
enum TransactionMode {
    ReadWrite,
    ReadOnlySnapshot,
}

/// Why a transaction body did not commit.
enum Aborted<E> {
    Rejected(E),
    Database(diesel::result::Error),
}

impl<E> From<diesel::result::Error> for Aborted<E> {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(err)
    }
}

impl PgStore {
    /// Creates a store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs `f` inside a read-write transaction.
    ///
    /// The transaction commits only when `f` returns `Ok` and `ctx` is still
    /// live afterwards; otherwise it is rolled back.
    ///
    /// # Errors
    ///
    /// Returns the closure's error unchanged, or a [`StoreError`] converted
    /// into `E` when the pool, the blocking task, the transaction itself or
    /// the context fails.
    pub async fn run_in_transaction<F, T, E>(
        &self,
        ctx: &OperationContext,
        operation: &'static str,
        f: F,
    ) -> Result<T, E>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StoreError> + Send + 'static,
    {
        self.run(ctx, operation, TransactionMode::ReadWrite, f).await
    }

    /// Runs `f` inside a read-only, repeatable-read transaction so that every
    /// query in `f` observes the same committed snapshot.
    ///
    /// # Errors
    ///
    /// Same as [`PgStore::run_in_transaction`].
    pub async fn run_read_only<F, T, E>(
        &self,
        ctx: &OperationContext,
        operation: &'static str,
        f: F,
    ) -> Result<T, E>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StoreError> + Send + 'static,
    {
        self.run(ctx, operation, TransactionMode::ReadOnlySnapshot, f)
            .await
    }

    async fn run<F, T, E>(
        &self,
        ctx: &OperationContext,
        operation: &'static str,
        mode: TransactionMode,
        f: F,
    ) -> Result<T, E>
    where
        F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<StoreError> + Send + 'static,
    {
        ctx.check().map_err(StoreError::from)?;
        let pool = self.pool.clone();
        let scoped_ctx = ctx.clone();

        tokio::task::spawn_blocking(move || {
            let mut pooled = pool
                .get()
                .map_err(|source| StoreError::Pool { operation, source })?;
            let connection: &mut PgConnection = &mut pooled;

            let body = |tx: &mut PgConnection| -> Result<T, Aborted<E>> {
                let value = f(tx).map_err(Aborted::Rejected)?;
                scoped_ctx
                    .check()
                    .map_err(|err| Aborted::Rejected(E::from(StoreError::from(err))))?;
                Ok(value)
            };

            let outcome = match mode {
                TransactionMode::ReadWrite => connection.transaction(body),
                TransactionMode::ReadOnlySnapshot => connection
                    .build_transaction()
                    .read_only()
                    .repeatable_read()
                    .run(body),
            };

            outcome.map_err(|aborted| match aborted {
                Aborted::Rejected(err) => {
                    warn!(operation, "unit of work rolled back");
                    err
                }
                Aborted::Database(source) => {
                    warn!(operation, error = %source, "transaction rolled back by database");
                    E::from(StoreError::Transaction { operation, source })
                }
            })
        })
        .await
        .map_err(|source| StoreError::Join { operation, source })?
    }
}
