//! Storage backend trait definition.

use crate::error::StorageResult;

/// A low-level storage backend for ShelfDB.
///
/// Storage backends are **opaque blob stores** keyed by collection name.
/// Each name maps to exactly one byte blob that is always replaced as a
/// whole. ShelfDB owns all format interpretation - backends do not know
/// about records, maps or the empty sentinel.
///
/// # Invariants
///
/// - `write` replaces the entire blob; a concurrent `read` observes either
///   the previous or the new content, never a mix of both
/// - `create_if_absent` never overwrites an existing blob
/// - `list` returns only names that `read` can serve
/// - Backends must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait StorageBackend: Send + Sync {
    /// Reads the blob stored under `name`.
    ///
    /// Returns `None` if nothing is stored under that name.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or an I/O error occurs.
    fn read(&self, name: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Replaces the blob stored under `name` with `data`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or an I/O error occurs.
    fn write(&self, name: &str, data: &[u8]) -> StorageResult<()>;

    /// Stores `initial` under `name` unless a blob already exists.
    ///
    /// Returns `true` if the blob was created by this call.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or an I/O error occurs.
    fn create_if_absent(&self, name: &str, initial: &[u8]) -> StorageResult<bool>;

    /// Removes the blob stored under `name`.
    ///
    /// Returns `true` if a blob existed and was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or an I/O error occurs.
    fn remove(&self, name: &str) -> StorageResult<bool>;

    /// Returns whether a blob is stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or an I/O error occurs.
    fn exists(&self, name: &str) -> StorageResult<bool>;

    /// Lists the names of all stored blobs, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing fails.
    fn list(&self) -> StorageResult<Vec<String>>;
}

/// Checks that `name` can be used as a blob name.
///
/// Names become file stems, so they must be non-empty, must not start with
/// a dot and must not contain path separators or NUL bytes.
pub fn validate_name(name: &str) -> StorageResult<()> {
    let invalid = name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0'])
        || name.ends_with(".tmp");

    if invalid {
        return Err(crate::error::StorageError::InvalidName(name.to_string()));
    }
    Ok(())
}
