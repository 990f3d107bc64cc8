//! Task persistence.
//!
//! A task is an aggregate of a validated name and description, a priority
//! [`domain::Status`], and the [`domain::LabelSet`] it owns. Updates replace
//! the whole aggregate, including every label, inside one transaction. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;
