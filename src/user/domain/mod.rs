//! Domain model for users.
//!
//! Password hashing happens outside this crate; users carry an already
//! hashed [`PasswordHash`].

mod credentials;
mod error;
mod ids;
mod user;

pub use credentials::{PasswordHash, UserName};
pub use error::UserDomainError;
pub use ids::UserId;
pub use user::{CreateUserCommand, PersistedUserData, User, UserUpdateData};
