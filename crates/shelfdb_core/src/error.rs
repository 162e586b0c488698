//! Error types for ShelfDB core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in ShelfDB core operations.
///
/// Absent ids, keys and paths are not errors: operations report them as
/// `None`, `false` or an empty result.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] shelfdb_storage::StorageError),

    /// Serialization error while writing a snapshot.
    #[error("codec error: {0}")]
    Codec(#[from] shelfdb_codec::CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A collection file exists but does not hold a valid snapshot.
    #[error("corrupt data in collection {collection}: {message}")]
    CorruptData {
        /// The collection whose file is corrupt.
        collection: String,
        /// Description of the problem.
        message: String,
    },

    /// The value found does not have the shape the operation requires.
    #[error("type mismatch: {message}")]
    TypeMismatch {
        /// Description of the mismatch.
        message: String,
    },

    /// Two records in a list collection would share an id.
    #[error("duplicate id {id} in collection {collection}")]
    DuplicateId {
        /// The collection.
        collection: String,
        /// The duplicated id.
        id: u64,
    },

    /// A record passed to the store is not acceptable.
    #[error("invalid record: {message}")]
    InvalidRecord {
        /// Description of the problem.
        message: String,
    },

    /// A deep path could not be parsed.
    #[error("invalid path {path:?}: {message}")]
    InvalidPath {
        /// The offending path.
        path: String,
        /// Description of the problem.
        message: String,
    },

    /// The collection name cannot be used.
    #[error("invalid collection name: {name:?}")]
    InvalidCollectionName {
        /// The rejected name.
        name: String,
    },

    /// Database directory is already locked.
    #[error("database locked: another handle has exclusive access")]
    DatabaseLocked,

    /// Invalid database directory.
    #[error("invalid database directory: {message}")]
    InvalidDirectory {
        /// Description of the issue.
        message: String,
    },

    /// A queued operation could not run to completion.
    #[error("operation failed: {message}")]
    TaskFailed {
        /// Description of the failure.
        message: String,
    },
}

impl CoreError {
    /// Creates a corrupt data error.
    pub fn corrupt_data(collection: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CorruptData {
            collection: collection.into(),
            message: message.into(),
        }
    }

    /// Creates a type mismatch error.
    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            message: message.into(),
        }
    }

    /// Creates an invalid record error.
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    /// Creates an invalid path error.
    pub fn invalid_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates an invalid directory error.
    pub fn invalid_directory(message: impl Into<String>) -> Self {
        Self::InvalidDirectory {
            message: message.into(),
        }
    }

    /// Creates a task failed error.
    pub fn task_failed(message: impl Into<String>) -> Self {
        Self::TaskFailed {
            message: message.into(),
        }
    }

    /// Returns true for [`CoreError::TypeMismatch`].
    #[must_use]
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }

    /// Returns true for [`CoreError::CorruptData`].
    #[must_use]
    pub fn is_corrupt_data(&self) -> bool {
        matches!(self, Self::CorruptData { .. })
    }
}

impl From<tokio::task::JoinError> for CoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            Self::task_failed("operation panicked")
        } else {
            Self::task_failed(err.to_string())
        }
    }
}
