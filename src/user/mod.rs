//! User persistence.
//!
//! Users are looked up by identifier or by unique name, and updated through
//! a transactional read-modify-write that overwrites only the supplied
//! fields.
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]

pub mod adapters;
pub mod domain;
pub mod ports;
