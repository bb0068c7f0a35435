use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("corrupt event row {id}: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("event store lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, Error>;
