//! Error types raised by object store implementations.

use thiserror::Error;

/// Errors surfaced by [`ObjectStore`](super::ObjectStore) implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("object store lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
