//! Whole-collection persistence.
//!
//! A collection is stored as one blob holding its entire value. Loading
//! decodes the blob; saving re-encodes the value and replaces the blob.
//! There is no partial update and no log: the last completed save wins.

use crate::collection::CollectionData;
use crate::error::{CoreError, CoreResult};
use shelfdb_codec::Format;
use shelfdb_storage::StorageBackend;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Loads and saves collection snapshots through a storage backend.
#[derive(Clone)]
pub struct SnapshotStore {
    backend: Arc<dyn StorageBackend>,
    format: Format,
    pretty: bool,
}

impl SnapshotStore {
    /// Creates a snapshot store writing `format` to `backend`.
    pub fn new(backend: Arc<dyn StorageBackend>, format: Format, pretty: bool) -> Self {
        Self {
            backend,
            format,
            pretty,
        }
    }

    /// Returns the serialization format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Loads a collection, creating it with the empty sentinel if it does
    /// not exist yet.
    ///
    /// # Errors
    ///
    /// Returns `CorruptData` if the stored bytes do not decode to a valid
    /// collection, or a storage error.
    pub fn load(&self, name: &str) -> CoreResult<CollectionData> {
        if self.backend.create_if_absent(name, &self.format.sentinel())? {
            debug!(collection = name, "created collection");
        }
        // A concurrent `delete_all` may remove the blob in between.
        let bytes = self.backend.read(name)?.unwrap_or_default();
        self.decode(name, &bytes)
    }

    /// Loads a collection without creating it.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn peek(&self, name: &str) -> CoreResult<Option<CollectionData>> {
        match self.backend.read(name)? {
            Some(bytes) => self.decode(name, &bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Decodes stored bytes of collection `name`.
    ///
    /// # Errors
    ///
    /// Returns `CorruptData` if the bytes are not a valid snapshot.
    pub fn decode(&self, name: &str, bytes: &[u8]) -> CoreResult<CollectionData> {
        if self.format.is_sentinel(bytes) {
            return Ok(CollectionData::Empty);
        }

        let value = self.format.decode(bytes).map_err(|e| corrupt(name, e.to_string()))?;
        let data =
            CollectionData::from_value(name, value).map_err(|e| corrupt(name, e.to_string()))?;
        debug!(collection = name, bytes = bytes.len(), "loaded collection");
        Ok(data)
    }

    /// Replaces the stored value of a collection.
    ///
    /// # Errors
    ///
    /// Returns a codec or storage error; the previous value stays in place.
    pub fn save(&self, name: &str, data: &CollectionData) -> CoreResult<()> {
        let bytes = self.format.encode(&data.to_value(), self.pretty)?;
        self.backend.write(name, &bytes)?;
        debug!(collection = name, bytes = bytes.len(), "saved collection");
        Ok(())
    }

    /// Removes a collection. Returns false if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns a storage error if removal fails.
    pub fn delete(&self, name: &str) -> CoreResult<bool> {
        let removed = self.backend.remove(name)?;
        if removed {
            debug!(collection = name, "deleted collection");
        }
        Ok(removed)
    }

    /// Returns true if the collection is stored.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the check fails.
    pub fn exists(&self, name: &str) -> CoreResult<bool> {
        Ok(self.backend.exists(name)?)
    }

    /// Returns the names of all stored collections, sorted.
    ///
    /// # Errors
    ///
    /// Returns a storage error if listing fails.
    pub fn names(&self) -> CoreResult<Vec<String>> {
        Ok(self.backend.list()?)
    }
}

fn corrupt(name: &str, message: String) -> CoreError {
    warn!(collection = name, error = %message, "corrupt collection data");
    CoreError::corrupt_data(name, message)
}

impl fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapshotStore")
            .field("format", &self.format)
            .field("pretty", &self.pretty)
            .finish_non_exhaustive()
    }
}
