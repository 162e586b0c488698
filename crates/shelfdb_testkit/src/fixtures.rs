//! Test fixtures and database helpers.
//!
//! Provides convenience functions for setting up test databases
//! and common test scenarios.

use shelfdb_core::{Config, Database};
use shelfdb_storage::InMemoryBackend;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// A test database with automatic cleanup.
pub struct TestDatabase {
    /// The database instance.
    pub db: Database,
    /// The temporary directory (kept alive to prevent cleanup).
    _temp_dir: Option<TempDir>,
}

impl TestDatabase {
    /// Creates a new in-memory test database.
    pub fn memory() -> Self {
        Self {
            db: Database::open_in_memory().expect("Failed to open in-memory database"),
            _temp_dir: None,
        }
    }

    /// Creates an in-memory test database whose collections start with the
    /// given raw bytes, e.g. to exercise corrupt files.
    pub fn with_raw_collections<I>(collections: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Vec<u8>)>,
    {
        let backend = InMemoryBackend::with_blobs(collections);
        Self {
            db: Database::with_backend(Arc::new(backend), Config::default()),
            _temp_dir: None,
        }
    }

    /// Creates a new file-based test database in a temporary directory.
    pub fn file() -> Self {
        Self::file_with_config(Config::default())
    }

    /// Creates a file-based test database with a custom configuration.
    ///
    /// Fsync is left to the caller's config; tests usually turn it off.
    pub fn file_with_config(config: Config) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db = Database::open_with_config(temp_dir.path(), config)
            .expect("Failed to open file database");

        Self {
            db,
            _temp_dir: Some(temp_dir),
        }
    }

    /// Returns the database path if file-based, None if in-memory.
    pub fn path(&self) -> Option<&Path> {
        self._temp_dir.as_ref().map(TempDir::path)
    }

    /// Closes the database and reopens it on the same directory.
    ///
    /// Returns `self` unchanged for in-memory databases, which cannot be
    /// reopened.
    pub fn reopen(self) -> Self {
        let Some(temp_dir) = self._temp_dir else {
            return self;
        };
        let config = self.db.config().clone();
        drop(self.db);

        let db = Database::open_with_config(temp_dir.path(), config)
            .expect("Failed to reopen file database");
        Self {
            db,
            _temp_dir: Some(temp_dir),
        }
    }
}

impl std::ops::Deref for TestDatabase {
    type Target = Database;

    fn deref(&self) -> &Self::Target {
        &self.db
    }
}

impl std::ops::DerefMut for TestDatabase {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.db
    }
}

/// Runs a test with a temporary in-memory database.
pub fn with_temp_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database) -> R,
{
    let test_db = TestDatabase::memory();
    f(&test_db.db)
}

/// Runs a test with a temporary file-based database.
pub fn with_file_db<F, R>(f: F) -> R
where
    F: FnOnce(&Database, &Path) -> R,
{
    let test_db = TestDatabase::file();
    let path = test_db.path().expect("File database should have a path");
    f(&test_db.db, path)
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;
    use shelfdb_core::{json, Value};

    /// Trainer names used by the player fixtures.
    pub const TRAINERS: [&str; 6] = ["Ash", "Misty", "Brock", "Gary", "Dawn", "Serena"];

    /// A list collection record for trainer `i`.
    pub fn player(i: usize) -> Value {
        json!({
            "name": TRAINERS[i % TRAINERS.len()],
            "badges": i % 9,
            "team": if i % 2 == 0 { "red" } else { "blue" },
        })
    }

    /// Creates a database whose `players` collection holds `count`
    /// records with ids `1..=count`.
    pub async fn populated_database(count: usize) -> TestDatabase {
        let test_db = TestDatabase::memory();
        let players = test_db
            .collection("players")
            .expect("Failed to open collection");
        players
            .bulk_insert((0..count).map(player).collect())
            .await
            .expect("Failed to insert players");
        test_db
    }

    /// Creates a database with a `config` map collection.
    pub async fn config_database() -> TestDatabase {
        let test_db = TestDatabase::memory();
        let config = test_db
            .collection("config")
            .expect("Failed to open collection");
        config
            .bulk_insert_entries(vec![
                ("volume".to_string(), json!(5)),
                ("theme".to_string(), json!({"dark": true, "accent": "red"})),
                ("motd".to_string(), json!("Welcome")),
            ])
            .await
            .expect("Failed to insert config");
        test_db
    }
}
