//! Domain model for tasks.
//!
//! Tasks carry a validated name and description, a [`Status`], and a
//! [`LabelSet`] they own. Nothing here depends on a storage engine.

mod error;
mod fields;
mod ids;
mod label;
mod status;
mod task;

pub use error::{InvalidStatus, TaskDomainError};
pub use fields::{TaskDescription, TaskName};
pub use ids::TaskId;
pub use label::{Label, LabelSet};
pub use status::Status;
pub use task::{CreateTaskCommand, PersistedTaskData, Task, TaskUpdateData};
