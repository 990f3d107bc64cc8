//! Port contracts for task persistence.
//!
//! Ports define infrastructure-agnostic interfaces implemented by the task
//! adapters.

pub mod repository;

pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
