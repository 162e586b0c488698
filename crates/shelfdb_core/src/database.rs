//! Database facade.

use crate::collection::Collection;
use crate::config::Config;
use crate::dir::DatabaseDir;
use crate::error::{CoreError, CoreResult};
use crate::lock::{LockManager, Pending, GLOBAL_LOCK_KEY};
use crate::snapshot::SnapshotStore;
use parking_lot::RwLock;
use shelfdb_storage::{validate_name, FileBackend, InMemoryBackend, StorageBackend};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// The main database handle.
///
/// A `Database` owns a base directory holding one file per collection, and
/// the [`LockManager`] that orders writes to those files. Collections are
/// created on demand:
///
/// ```rust,ignore
/// use shelfdb_core::Database;
/// use serde_json::json;
///
/// let db = Database::open("data")?;
/// let players = db.collection("players")?;
/// players.insert(json!({"name": "Ash"})).await?;
///
/// let config = db.collection("config")?;
/// config.insert_key("volume", json!(5)).await?;
/// ```
///
/// # In-Memory Databases
///
/// For tests, `Database::open_in_memory()` keeps every collection in
/// memory; nothing touches the file system.
pub struct Database {
    /// Configuration.
    config: Config,
    /// Base directory (holds the lock). None for in-memory databases.
    dir: Option<DatabaseDir>,
    /// Snapshot persistence shared by all collections.
    store: SnapshotStore,
    /// Per-collection write ordering.
    locks: Arc<LockManager>,
    /// Collection handles, created on first use.
    collections: Arc<RwLock<HashMap<String, Collection>>>,
}

impl Database {
    /// Opens a database in `path` with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Another handle has the directory locked (`DatabaseLocked`)
    /// - The directory is missing and may not be created (`InvalidDirectory`)
    /// - I/O errors occur
    pub fn open(path: impl AsRef<Path>) -> CoreResult<Self> {
        Self::open_with_config(path, Config::default())
    }

    /// Opens a database in `path` with a custom configuration.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use shelfdb_core::{Config, Database, Format};
    ///
    /// let config = Config::default().format(Format::Cbor).sync_on_write(false);
    /// let db = Database::open_with_config("data", config)?;
    /// ```
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    pub fn open_with_config(path: impl AsRef<Path>, config: Config) -> CoreResult<Self> {
        let path = path.as_ref();
        let dir = DatabaseDir::open(path, config.create_if_missing, config.lock_directory)?;
        let backend = FileBackend::open(dir.path(), config.format.extension(), config.sync_on_write)?;

        info!(
            path = %path.display(),
            format = %config.format,
            locked = dir.is_locked(),
            "opened database"
        );

        let mut db = Self::with_backend(Arc::new(backend), config);
        db.dir = Some(dir);
        Ok(db)
    }

    /// Opens a fresh in-memory database.
    ///
    /// # Errors
    ///
    /// Never fails today; the signature matches the other constructors.
    pub fn open_in_memory() -> CoreResult<Self> {
        Ok(Self::with_backend(
            Arc::new(InMemoryBackend::new()),
            Config::default(),
        ))
    }

    /// Creates a database over an arbitrary storage backend.
    ///
    /// This is a lower-level constructor; directory options in `config`
    /// are ignored.
    pub fn with_backend(backend: Arc<dyn StorageBackend>, config: Config) -> Self {
        let store = SnapshotStore::new(backend, config.format, config.pretty);
        Self {
            config,
            dir: None,
            store,
            locks: Arc::new(LockManager::new()),
            collections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns the handle for a collection, creating it on first use.
    ///
    /// No I/O happens here; the collection file is created by the first
    /// operation on it.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCollectionName` if the name is empty, starts with a
    /// dot, contains a path separator or NUL, or is reserved.
    pub fn collection(&self, name: &str) -> CoreResult<Collection> {
        if let Some(collection) = self.collections.read().get(name) {
            return Ok(collection.clone());
        }

        if name == GLOBAL_LOCK_KEY || validate_name(name).is_err() {
            return Err(CoreError::InvalidCollectionName {
                name: name.to_string(),
            });
        }

        let mut collections = self.collections.write();
        let collection = collections.entry(name.to_string()).or_insert_with(|| {
            Collection::new(name.to_string(), self.store.clone(), Arc::clone(&self.locks))
        });
        Ok(collection.clone())
    }

    /// Returns the names of all stored collections, sorted.
    ///
    /// # Errors
    ///
    /// Returns a storage error if listing fails.
    pub fn collection_names(&self) -> CoreResult<Vec<String>> {
        self.store.names()
    }

    /// Deletes every stored collection. Resolves to true if anything was
    /// removed.
    ///
    /// Runs under the database-wide key, so concurrent `delete_all` calls
    /// are ordered among themselves. It does not wait for per-collection
    /// writes; a write racing with it may recreate its file.
    pub fn delete_all(&self) -> Pending<bool> {
        let store = self.store.clone();
        let collections = Arc::clone(&self.collections);
        self.locks.run_exclusive(GLOBAL_LOCK_KEY, move || {
            let mut removed = 0usize;
            for name in store.names()? {
                if store.delete(&name)? {
                    removed += 1;
                }
            }
            for collection in collections.read().values() {
                collection.reset_ids();
            }
            info!(removed, "deleted all collections");
            Ok(removed > 0)
        })
    }

    /// Returns the base directory, or `None` for in-memory databases.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.dir.as_ref().map(DatabaseDir::path)
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the lock manager ordering writes.
    #[must_use]
    pub fn locks(&self) -> &Arc<LockManager> {
        &self.locks
    }

    /// Returns the snapshot store.
    #[must_use]
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path())
            .field("format", &self.config.format)
            .field("collections", &self.collections.read().len())
            .finish()
    }
}
