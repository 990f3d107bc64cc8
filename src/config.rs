//! Store configuration.
//!
//! Settings come from the environment:
//!
//! - `TODO_STORE_DATABASE_URL`: `PostgreSQL` connection URL (required)
//! - `TODO_STORE_POOL_MAX_SIZE`: maximum pooled connections (default 10)
//! - `TODO_STORE_CONNECT_TIMEOUT_SECS`: seconds to wait for a pooled
//!   connection (default 30)

use crate::storage::{PgPool, PgStore};
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Environment variable holding the database URL.
pub const ENV_DATABASE_URL: &str = "TODO_STORE_DATABASE_URL";
/// Environment variable holding the pool size.
pub const ENV_POOL_MAX_SIZE: &str = "TODO_STORE_POOL_MAX_SIZE";
/// Environment variable holding the connection timeout in seconds.
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "TODO_STORE_CONNECT_TIMEOUT_SECS";

const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Errors raised while loading configuration or building the pool.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set or is blank.
    #[error("missing required setting {0}")]
    Missing(&'static str),

    /// A variable could not be parsed.
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Rejected value.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The connection pool could not be built.
    #[error("failed to build connection pool: {0}")]
    Pool(#[from] PoolError),
}

/// Connection settings for the `PostgreSQL` store.
#[derive(Clone, PartialEq, Eq)]
pub struct StoreConfig {
    database_url: String,
    pool_max_size: u32,
    connect_timeout: Duration,
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("database_url", &"<redacted>")
            .field("pool_max_size", &self.pool_max_size)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl StoreConfig {
    /// Creates a configuration with default pool settings.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }

    /// Loads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when the database URL is absent and
    /// [`ConfigError::Invalid`] when a numeric setting cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`StoreConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup(ENV_DATABASE_URL)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::Missing(ENV_DATABASE_URL))?;

        let pool_max_size = match lookup(ENV_POOL_MAX_SIZE) {
            Some(raw) => parse_pool_size(&raw)?,
            None => DEFAULT_POOL_MAX_SIZE,
        };
        let connect_timeout = match lookup(ENV_CONNECT_TIMEOUT_SECS) {
            Some(raw) => Duration::from_secs(parse_number(ENV_CONNECT_TIMEOUT_SECS, &raw)?),
            None => Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self {
            database_url,
            pool_max_size,
            connect_timeout,
        })
    }

    /// Overrides the maximum pool size.
    #[must_use]
    pub const fn with_pool_max_size(mut self, pool_max_size: u32) -> Self {
        self.pool_max_size = pool_max_size;
        self
    }

    /// Overrides the connection timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Returns the database URL.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Returns the maximum pool size.
    #[must_use]
    pub const fn pool_max_size(&self) -> u32 {
        self.pool_max_size
    }

    /// Returns the connection timeout.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Builds an `r2d2` pool; blocks until the first connection is
    /// established or the timeout elapses.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pool`] when the pool cannot connect.
    pub fn build_pool(&self) -> Result<PgPool, ConfigError> {
        let manager = ConnectionManager::<PgConnection>::new(&self.database_url);
        let pool = Pool::builder()
            .max_size(self.pool_max_size)
            .connection_timeout(self.connect_timeout)
            .build(manager)?;
        info!(
            pool_max_size = self.pool_max_size,
            connect_timeout_secs = self.connect_timeout.as_secs(),
            "database pool ready"
        );
        Ok(pool)
    }

    /// Builds a [`PgStore`] over a fresh pool.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Pool`] when the pool cannot connect.
    pub fn build_store(&self) -> Result<PgStore, ConfigError> {
        self.build_pool().map(PgStore::new)
    }
}

fn parse_number(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim().parse().map_err(|err: std::num::ParseIntError| ConfigError::Invalid {
        key,
        value: raw.to_owned(),
        reason: err.to_string(),
    })
}

fn parse_pool_size(raw: &str) -> Result<u32, ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        key: ENV_POOL_MAX_SIZE,
        value: raw.to_owned(),
        reason,
    };
    let size = u32::try_from(parse_number(ENV_POOL_MAX_SIZE, raw)?)
        .map_err(|err| invalid(err.to_string()))?;
    if size == 0 {
        return Err(invalid("pool size must be at least 1".to_owned()));
    }
    Ok(size)
}
