//! Error types raised by record store implementations.

use thiserror::Error;

use super::Expected;

/// Errors surfaced by record store implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record store lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("version conflict on {table}/{key}: expected {expected}, found {found:?}")]
    VersionConflict {
        table: String,
        key: String,
        expected: Expected,
        found: Option<u64>,
    },
}

impl RepositoryError {
    /// A concurrent writer got there first; re-reading and retrying can succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}

pub type Result<T> = std::result::Result<T, RepositoryError>;
