//! Unit-of-work stores shared by the repository adapters.
//!
//! Both stores expose `run_in_transaction`, which hands a closure a handle
//! scoped to one atomic unit of work. The closure's writes become visible
//! only if it returns `Ok` and the operation context is still live at commit
//! time.

mod error;
mod memory;
mod postgres;

pub use error::StoreError;
pub use memory::InMemoryStore;
pub use postgres::{PgPool, PgStore};
