//! In-memory unit-of-work store.

use super::StoreError;
use crate::context::OperationContext;
use std::sync::{Arc, RwLock};
use tracing::warn;

/// Lock-guarded state with copy-on-write transactions.
///
/// A transaction works on a clone of the state and swaps it in only on
/// success, so a failed or cancelled unit of work leaves nothing behind.
/// Writers hold the lock for the whole unit of work, which serializes
/// concurrent updates.
#[derive(Debug)]
pub struct InMemoryStore<S> {
    state: Arc<RwLock<S>>,
}

impl<S> Clone for InMemoryStore<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<S: Default> Default for InMemoryStore<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S> InMemoryStore<S> {
    /// Creates a store holding `state`.
    #[must_use]
    pub fn new(state: S) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Runs `f` against a snapshot of the state and commits it on success.
    ///
    /// # Errors
    ///
    /// Returns the closure's error unchanged, or a [`StoreError`] converted
    /// into `E` when the lock is poisoned or `ctx` is cancelled or expired
    /// before commit.
    pub fn run_in_transaction<F, T, E>(
        &self,
        ctx: &OperationContext,
        operation: &'static str,
        f: F,
    ) -> Result<T, E>
    where
        S: Clone,
        F: FnOnce(&mut S) -> Result<T, E>,
        E: From<StoreError>,
    {
        ctx.check().map_err(StoreError::from)?;
        let mut guard = self
            .state
            .write()
            .map_err(|_| StoreError::Poisoned { operation })?;
        let mut working = guard.clone();
        let value = f(&mut working).inspect_err(|_| warn!(operation, "unit of work rolled back"))?;
        ctx.check().map_err(|err| {
            warn!(operation, reason = %err, "unit of work rolled back before commit");
            StoreError::from(err)
        })?;
        *guard = working;
        Ok(value)
    }

    /// Runs `f` against the latest committed state.
    ///
    /// # Errors
    ///
    /// Returns the closure's error unchanged, or a [`StoreError`] converted
    /// into `E` when the lock is poisoned or `ctx` is no longer live.
    pub fn read<F, T, E>(&self, ctx: &OperationContext, operation: &'static str, f: F) -> Result<T, E>
    where
        F: FnOnce(&S) -> Result<T, E>,
        E: From<StoreError>,
    {
        ctx.check().map_err(StoreError::from)?;
        let guard = self
            .state
            .read()
            .map_err(|_| StoreError::Poisoned { operation })?;
        f(&*guard)
    }
}
