//! Cancellation and deadline handling for repository operations.
//!
//! Every repository call takes an [`OperationContext`]. Stores check it before
//! starting work and again right before committing, so a cancelled or expired
//! context never leaves a partially applied write behind.

use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Reason an operation context stopped accepting work.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ContextError {
    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// The deadline attached to the context has passed.
    #[error("operation deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellation token plus optional deadline carried by each repository call.
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl OperationContext {
    /// Creates a context that is never cancelled and has no deadline.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Creates a context bound to an existing cancellation token.
    #[must_use]
    pub const fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self {
            cancellation,
            deadline: None,
        }
    }

    /// Sets an absolute deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Sets a deadline relative to now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now()
            .checked_add(timeout)
            .unwrap_or_else(Instant::now);
        self.with_deadline(deadline)
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fails when the context has been cancelled or its deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::Cancelled`] after cancellation and
    /// [`ContextError::DeadlineExceeded`] once the deadline is reached.
    pub fn check(&self) -> Result<(), ContextError> {
        if self.cancellation.is_cancelled() {
            return Err(ContextError::Cancelled);
        }
        if self
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            return Err(ContextError::DeadlineExceeded);
        }
        Ok(())
    }
}
