//! Server and CLI error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// History commands need a persistent store.
    #[error("no session database configured; set session.db_path in trip-coach.toml")]
    DatabaseNotConfigured,

    /// The configured database file does not exist yet.
    #[error("database not found at {}. Run 'trip-coach serve' first", .path.display())]
    DatabaseNotFound { path: PathBuf },

    /// The requested session has no stored events.
    #[error("no session found with id '{0}'")]
    SessionNotFound(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Runtime(#[from] runtime::Error),

    #[error(transparent)]
    Storage(#[from] storage::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
