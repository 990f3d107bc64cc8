//! todo-store: persistence layer for a task-tracking application.
//!
//! The crate stores tasks (with priority status and labels) and users, and
//! exposes create, read, update and delete operations through repository
//! traits that are independent of the storage engine.
//!
//! # Architecture
//!
//! todo-store follows hexagonal architecture principles:
//!
//! - **Domain**: validated value types and aggregates with no infrastructure
//!   dependencies
//! - **Ports**: repository traits and their error types
//! - **Adapters**: `PostgreSQL` (Diesel) and in-memory implementations
//!
//! # Modules
//!
//! - [`task`]: task aggregate, label set and status handling
//! - [`user`]: user aggregate
//! - [`storage`]: unit-of-work stores shared by the adapters
//! - [`context`]: cancellation and deadlines for repository calls
//! - [`config`]: environment-driven store configuration
//! - [`error`]: error classification shared by both repositories

pub mod config;
pub mod context;
pub mod error;
pub mod storage;
pub mod task;
pub mod user;
