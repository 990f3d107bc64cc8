//! In-memory user adapters.

mod user;

pub use user::InMemoryUserRepository;
