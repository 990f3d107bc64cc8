//! Shared test helpers for in-memory repository integration tests.

use mockable::DefaultClock;
use rstest::fixture;
use std::io;
use std::sync::Arc;
use todo_store::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{CreateTaskCommand, LabelSet, Status, TaskDescription, TaskName, TaskUpdateData},
};
use todo_store::user::{
    adapters::memory::InMemoryUserRepository,
    domain::{CreateUserCommand, PasswordHash, UserName},
};
use tokio::runtime::Runtime;

/// Provides a tokio runtime for async operations in tests.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
#[fixture]
pub fn runtime() -> io::Result<Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
}

/// Provides a clock for command creation.
#[fixture]
pub fn clock() -> DefaultClock {
    DefaultClock
}

/// Provides a fresh in-memory task repository for each test.
#[fixture]
pub fn task_repo() -> InMemoryTaskRepository<DefaultClock> {
    InMemoryTaskRepository::new(Arc::new(DefaultClock))
}

/// Provides a fresh in-memory user repository for each test.
#[fixture]
pub fn user_repo() -> InMemoryUserRepository<DefaultClock> {
    InMemoryUserRepository::new(Arc::new(DefaultClock))
}

/// Builds a create command from raw values.
///
/// # Panics
///
/// Panics when a value fails validation.
pub fn task_command(
    clock: &DefaultClock,
    name: &str,
    status: Status,
    labels: &[&str],
) -> CreateTaskCommand {
    CreateTaskCommand::new(
        TaskName::new(name).expect("valid task name"),
        TaskDescription::new(format!("{name} description")).expect("valid description"),
        status,
        LabelSet::new(labels.iter().copied()).expect("valid labels"),
        clock,
    )
}

/// Builds full replacement data from raw values.
///
/// # Panics
///
/// Panics when a value fails validation.
pub fn task_update(name: &str, description: &str, status: Status, labels: &[&str]) -> TaskUpdateData {
    TaskUpdateData {
        name: TaskName::new(name).expect("valid task name"),
        description: TaskDescription::new(description).expect("valid description"),
        status,
        labels: LabelSet::new(labels.iter().copied()).expect("valid labels"),
    }
}

/// Builds a user create command from raw values.
///
/// # Panics
///
/// Panics when a value fails validation.
pub fn user_command(name: &str, password_hash: &str) -> CreateUserCommand {
    CreateUserCommand {
        name: UserName::new(name).expect("valid user name"),
        password_hash: PasswordHash::new(password_hash).expect("valid password hash"),
    }
}
